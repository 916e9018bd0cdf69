fn main() {
    magelang::cli::run();
}
