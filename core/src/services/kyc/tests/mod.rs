mod fixtures;
mod rate_limiter_tests;
mod verify_otp_tests;
