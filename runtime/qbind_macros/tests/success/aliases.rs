use qbind::{Bind, Bindable, QueryBinder, Shape};

#[derive(Bind, Default, Debug, PartialEq)]
struct UserId(u64);

#[derive(Bind, Default, Debug, PartialEq)]
struct Tags(Vec<String>);

#[derive(Bind, Default, Debug)]
struct Query {
    user: UserId,
    tags: Tags,
}

fn main() {
    assert!(matches!(UserId::descriptor().shape(), Shape::Uint { bits: 64 }));
    assert_ne!(UserId::descriptor().id(), u64::descriptor().id());

    let engine = QueryBinder::default();
    assert_eq!(engine.bind_value::<UserId>("12"), UserId(12));

    let params = qbind::QueryMap::parse("user=5&tags.0=a");
    let query: Query = engine.bind_copy(&params);
    assert_eq!(query.user, UserId(5));
    assert_eq!(query.tags, Tags(vec!["a".into()]));
}
