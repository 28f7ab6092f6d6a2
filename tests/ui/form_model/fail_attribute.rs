#[derive(calmform::form::FormModel)]
struct Signup {
    #[form(skip)]
    email: String,
}

fn main() {}
