use qbind::Bind;

#[derive(Bind, Default)]
struct Search {
    #[bind(default)]
    query: String,
}

fn main() {}
