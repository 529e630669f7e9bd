use qbind::Bind;

#[derive(Bind)]
enum Order {
    Asc,
    Desc,
}

fn main() {}
