fn main() {
    // ESP-IDF environment is only needed for flash builds; host tests
    // compile without the toolchain.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
