pub mod router_tests;
