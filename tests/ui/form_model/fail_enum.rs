#[derive(calmform::form::FormModel)]
enum Choice {
    Yes,
    No,
}

fn main() {}
