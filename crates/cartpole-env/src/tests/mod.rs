//! Integration tests for the cart-pole environment.

mod environment_tests;
