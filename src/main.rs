fn main() {
    distbench::cmdline();
}
