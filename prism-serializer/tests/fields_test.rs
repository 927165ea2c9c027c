use anyhow::Result;
use prism_serializer::{
    record, CustomField, Field, MethodTable, SerializeError, Serializer, Value,
};
use serde_json::{json, Value as JsonValue};

struct TransField;

impl CustomField for TransField {
    fn to_value(&self, raw: Value) -> prism_serializer::Result<JsonValue> {
        raw.into_json()
    }
}

#[test]
fn test_to_value_noop() -> Result<()> {
    let field = Field::generic();
    assert_eq!(field.to_value(Value::Int(5))?, json!(5));
    assert_eq!(field.to_value(Value::from("a"))?, json!("a"));
    assert_eq!(field.to_value(Value::Null)?, JsonValue::Null);
    Ok(())
}

#[test]
fn test_as_getter_none() -> Result<()> {
    assert!(Field::generic().as_getter("a", &())?.is_none());
    assert!(Field::int().as_getter("a", &())?.is_none());
    Ok(())
}

#[test]
fn test_is_to_value_overridden() {
    assert!(!Field::generic().overrides_to_value());
    assert!(Field::custom(TransField).overrides_to_value());
    assert!(Field::int().overrides_to_value());
}

#[test]
fn test_str_field() -> Result<()> {
    let field = Field::str();
    assert_eq!(field.to_value(Value::from("a"))?, json!("a"));
    assert_eq!(field.to_value(Value::Int(5))?, json!("5"));
    assert_eq!(field.to_value(Value::Bool(true))?, json!("true"));
    assert_eq!(field.to_value(Value::Null)?, json!("null"));
    assert_eq!(field.to_value(Value::Float(2.0))?, json!("2.0"));
    assert_eq!(field.to_value(record! { "a" => 1 })?, json!(r#"{"a":1}"#));
    Ok(())
}

#[test]
fn test_bool_field() -> Result<()> {
    let field = Field::bool();
    assert_eq!(field.to_value(Value::Bool(true))?, json!(true));
    assert_eq!(field.to_value(Value::Bool(false))?, json!(false));
    assert_eq!(field.to_value(Value::Int(1))?, json!(true));
    assert_eq!(field.to_value(Value::Int(0))?, json!(false));
    assert_eq!(field.to_value(Value::Null)?, json!(false));
    Ok(())
}

#[test]
fn test_int_field() -> Result<()> {
    let field = Field::int();
    assert_eq!(field.to_value(Value::Int(5))?, json!(5));
    assert_eq!(field.to_value(Value::Float(5.4))?, json!(5));
    assert_eq!(field.to_value(Value::from("5"))?, json!(5));
    Ok(())
}

#[test]
fn test_int_field_rejects_non_numeric() {
    let err = Field::int().to_value(Value::from("five")).unwrap_err();
    assert!(matches!(
        err,
        SerializeError::Conversion {
            field: "int",
            found: "str",
            ..
        }
    ));
    assert!(Field::int().to_value(Value::Null).is_err());
}

#[test]
fn test_float_field() -> Result<()> {
    let field = Field::float();
    assert_eq!(field.to_value(Value::Float(5.2))?, json!(5.2));
    assert_eq!(field.to_value(Value::from("5.5"))?, json!(5.5));
    assert_eq!(field.to_value(Value::Int(2))?, json!(2.0));
    assert!(field.to_value(Value::from("abc")).is_err());
    Ok(())
}

#[test]
fn test_method_field() -> Result<()> {
    let serializer = MethodTable::new("FakeSerializer")
        .with_method("get_a", |obj| obj.attribute("a"))
        .with_method("z_sub_1", |obj| {
            let z = obj.attribute("z")?.as_i64().unwrap_or_default();
            Ok(Value::Int(z - 1))
        });

    let getter = Field::method().as_getter("a", &serializer)?.unwrap();
    assert_eq!(getter.raw_value_of(&record! { "a" => 3 })?, Value::Int(3));

    let getter = Field::method_named("z_sub_1")
        .as_getter("a", &serializer)?
        .unwrap();
    assert_eq!(getter.raw_value_of(&record! { "z" => 3 })?, Value::Int(2));
    Ok(())
}

#[test]
fn test_field_label() {
    let field = Field::str().with_label("@id");
    assert_eq!(field.label(), Some("@id"));
}

#[test]
fn test_datetime_field() -> Result<()> {
    let datetime_str = "2022-01-01T12:00:00Z";
    assert_eq!(
        Field::datetime().to_value(Value::from(datetime_str))?,
        json!("2022-01-01T12:00:00+00:00")
    );

    let custom = Field::datetime_format("%m/%d/%Y %I:%M %p");
    assert_eq!(
        custom.to_value(Value::from(datetime_str))?,
        json!("01/01/2022 12:00 PM")
    );

    assert_eq!(
        Field::datetime().to_value(Value::from("invalid datetime"))?,
        json!("invalid datetime")
    );
    assert_eq!(Field::datetime().to_value(Value::Null)?, JsonValue::Null);
    assert_eq!(
        Field::datetime().to_value(Value::from("2022-01-01T12:00:00+0000"))?,
        json!("2022-01-01T12:00:00+00:00")
    );
    Ok(())
}

#[test]
fn test_call_field() -> Result<()> {
    let serializer = Serializer::builder("Calls")
        .field("bar", Field::int().with_call(true))
        .build()?;
    let out = serializer.serialize(&record! { "bar" => Value::callable(|| Ok(Value::Int(5))) })?;
    assert_eq!(out, json!({"bar": 5}));
    Ok(())
}

#[test]
fn test_call_field_on_non_callable() -> Result<()> {
    let serializer = Serializer::builder("Calls")
        .field("bar", Field::generic().with_call(true))
        .build()?;
    assert!(matches!(
        serializer.serialize(&record! { "bar" => 5 }),
        Err(SerializeError::NotCallable { found: "int" })
    ));
    Ok(())
}

#[test]
fn test_custom_field_getter() -> Result<()> {
    struct Upper;

    impl CustomField for Upper {
        fn to_value(&self, raw: Value) -> prism_serializer::Result<JsonValue> {
            Ok(JsonValue::String(
                raw.as_str().unwrap_or_default().to_uppercase(),
            ))
        }

        fn as_getter(
            &self,
            source_name: &str,
            _owner: &dyn prism_serializer::MethodResolver,
        ) -> prism_serializer::Result<Option<prism_serializer::Getter>> {
            let key = format!("{source_name}_raw");
            Ok(Some(prism_serializer::Getter::custom(move |obj| {
                obj.attribute(&key)
            })))
        }
    }

    let serializer = Serializer::builder("Custom")
        .field("name", Field::custom(Upper))
        .build()?;
    let out = serializer.serialize(&record! { "name_raw" => "ada" })?;
    assert_eq!(out, json!({"name": "ADA"}));
    Ok(())
}
