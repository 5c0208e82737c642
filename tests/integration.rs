// Integration tests module

mod integration {
    mod alerts_test;
    mod config_test;
    mod session_test;
}
