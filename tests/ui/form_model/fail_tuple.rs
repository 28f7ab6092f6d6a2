#[derive(calmform::form::FormModel)]
struct Pair(String, bool);

fn main() {}
