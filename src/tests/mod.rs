//! tests/mod.rs
//! Pruebas del servicio de SMS (se ejecutan con `cargo test`).

mod support;

mod gateway_tests;
