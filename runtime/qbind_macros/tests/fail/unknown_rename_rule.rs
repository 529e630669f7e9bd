use qbind::Bind;

#[derive(Bind, Default)]
#[bind(rename_all = "Title Case")]
struct Search {
    query: String,
}

fn main() {}
