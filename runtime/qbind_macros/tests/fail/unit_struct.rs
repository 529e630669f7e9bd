use qbind::Bind;

#[derive(Bind, Default)]
struct Marker;

fn main() {}
