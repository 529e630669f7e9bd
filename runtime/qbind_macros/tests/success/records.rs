use qbind::{Bind, Bindable, QueryBinder, QueryMap, Record};

#[derive(Bind, Default)]
struct Empty {}

#[derive(Bind, Default)]
struct Base {
    id: u64,
}

#[derive(Bind, Default)]
#[bind(rename_all = "camelCase")]
struct Profile {
    #[bind(flatten)]
    base: Base,
    display_name: String,
    #[bind(rename = "mail")]
    email_address: Option<String>,
    r#type: String,
    #[bind(skip)]
    _cache: std::cell::Cell<u8>,
    #[bind(rename = "-")]
    _hidden: std::rc::Rc<()>,
    nicknames: Vec<String>,
    #[bind(flatten)]
    parent: Option<Box<Profile>>,
}

fn main() {
    assert_eq!(<Empty as Record>::FIELDS.len(), 0);
    assert_eq!(<Profile as Record>::FIELDS.len(), 6);

    let wire_names: Vec<_> = Profile::FIELDS.iter().map(|f| f.wire_name()).collect();
    assert_eq!(
        wire_names,
        [
            Some("base"),
            Some("displayName"),
            Some("mail"),
            Some("type"),
            Some("nicknames"),
            Some("parent"),
        ]
    );
    assert!(Profile::descriptor().is_record());

    let params = QueryMap::parse("id=3&displayName=Ada&type=admin");
    let profile: Profile = QueryBinder::default().bind_copy(&params);
    assert_eq!(profile.base.id, 3);
    assert_eq!(profile.display_name, "Ada");
    assert_eq!(profile.r#type, "admin");
    assert_eq!(profile.email_address, None);
}
