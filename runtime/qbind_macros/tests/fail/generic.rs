use qbind::Bind;

#[derive(Bind, Default)]
struct Wrapper<T> {
    value: T,
}

fn main() {}
