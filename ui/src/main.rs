fn main() {
    ui::main();
}
