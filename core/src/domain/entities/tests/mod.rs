mod address_tests;
mod verification_tests;
