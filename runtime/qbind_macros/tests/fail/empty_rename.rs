use qbind::Bind;

#[derive(Bind, Default)]
struct Search {
    #[bind(rename = "")]
    query: String,
}

fn main() {}
