use qbind::Bind;

#[derive(Bind, Default)]
struct Base {
    id: u64,
}

#[derive(Bind, Default)]
struct Account {
    #[bind(flatten, rename = "b")]
    base: Base,
}

fn main() {}
