fn main() {
    // ESP-IDF link/env arguments are only needed for the device build.
    // Host builds (tests, simulation) skip them entirely.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
