mod support;

mod solve_tests;
