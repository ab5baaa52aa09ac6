fn main() {
    medgraph::cli::run();
}
