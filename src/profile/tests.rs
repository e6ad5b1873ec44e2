use super::*;

#[test]
fn test_missing_category_reads_empty() {
    let profile = Profile::new("alice").with(Category::Skills, ["Rust"]);

    assert_eq!(profile.attributes(Category::Skills), ["Rust".to_string()]);
    assert!(profile.attributes(Category::Education).is_empty());
}

#[test]
fn test_blank_attributes_are_dropped() {
    let profile = Profile::new("bob").with(Category::Skills, ["  Go ", "", "   "]);

    assert_eq!(profile.attributes(Category::Skills), ["Go".to_string()]);
    assert_eq!(profile.attribute_count(), 1);
}

#[test]
fn test_empty_category_not_listed() {
    let profile = Profile::new("carol")
        .with(Category::Skills, Vec::<String>::new())
        .with(Category::Education, ["CS"]);

    let categories: Vec<_> = profile.categories().collect();
    assert_eq!(categories, vec![Category::Education]);
}

#[test]
fn test_category_union() {
    let a = Profile::new("a").with(Category::Skills, ["Python"]);
    let b = Profile::new("b").with(Category::Education, ["CS"]);

    let union = Profile::category_union(&a, &b);
    assert_eq!(
        union.into_iter().collect::<Vec<_>>(),
        vec![Category::Skills, Category::Education]
    );
}

#[test]
fn test_category_from_str() {
    assert_eq!("Skills".parse::<Category>().unwrap(), Category::Skills);
    assert_eq!(" experience ".parse::<Category>().unwrap(), Category::Experience);
    assert_eq!("language".parse::<Category>().unwrap(), Category::Languages);
    assert!("hobbies".parse::<Category>().is_err());
}

#[test]
fn test_deserialize_ignores_unknown_categories() {
    let json = serde_json::json!({
        "name": "dana",
        "attributes": {
            "skills": ["Python", "CUDA"],
            "hobbies": ["climbing"],
            "Education": ["CS"]
        }
    });

    let profile: Profile = serde_json::from_value(json).expect("should deserialize");

    assert_eq!(profile.name, "dana");
    assert_eq!(profile.attributes(Category::Skills).len(), 2);
    assert_eq!(profile.attributes(Category::Education), ["CS".to_string()]);
    assert_eq!(profile.attribute_count(), 3);
}

#[test]
fn test_deserialize_without_attributes() {
    let profile: Profile = serde_json::from_str(r#"{"name":"empty"}"#).unwrap();
    assert!(profile.is_empty());
}

#[test]
fn test_serialize_uses_lowercase_keys() {
    let profile = Profile::new("eve").with(Category::Experience, ["ML Engineer"]);
    let json = serde_json::to_value(&profile).unwrap();

    assert_eq!(json["attributes"]["experience"][0], "ML Engineer");
}
