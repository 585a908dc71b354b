//! Relation inference from identity-carrying properties and array items.

use serde_json::{json, Value};

use crate::common;

#[test]
fn object_property_with_identity_becomes_belongs_to_one() {
    let document = json!({
        "$id": "rootid",
        "title": "TestModel",
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "address": {
                "$id": "objid",
                "type": "object",
                "properties": {
                    "street": { "type": "string" },
                    "city": { "type": "string", "default": "Waterloo" }
                }
            }
        }
    });
    let address_subtree = document["properties"]["address"].clone();

    let models = common::compile_document(document);
    assert_eq!(models.len(), 2);

    // The parent swaps the embedded property for a foreign-key stub.
    let parent = &models["TestModel"];
    assert_eq!(common::property_names(parent), ["name", "address_id"]);
    assert_eq!(
        common::properties(parent)["address_id"],
        json!({ "type": "integer" })
    );

    let relation = &parent.relations["address"];
    assert_eq!(relation.kind, "BelongsToOne");
    assert_eq!(relation.target_table, "objid");
    assert_eq!(relation.join.from, "TestModel.address_id");
    assert_eq!(relation.join.to, "objid.id");
    assert!(relation.join.through.is_none());

    // The sub-table keeps its subtree untouched and registers under its $id.
    let sub = &models["objid"];
    assert_eq!(sub.table_name, "objid");
    assert!(sub.relations.is_empty());
    assert_eq!(Value::Object(sub.schema.clone()), address_subtree);
}

#[test]
fn array_items_with_identity_become_has_many() {
    let document = json!({
        "$id": "rootid",
        "title": "TestModel",
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "addresses": {
                "type": "array",
                "items": { "$id": "objid" }
            }
        }
    });

    let models = common::compile_document(document);
    assert_eq!(models.len(), 2);

    // The array property disappears from the parent entirely.
    let parent = &models["TestModel"];
    assert_eq!(common::property_names(parent), ["name"]);

    let relation = &parent.relations["addresses"];
    assert_eq!(relation.kind, "HasMany");
    assert_eq!(relation.target_table, "objid");
    assert_eq!(relation.join.from, "TestModel.id");
    assert_eq!(relation.join.to, "objid.TestModel_id");

    // The target gains the synthesized foreign-key column.
    let sub = &models["objid"];
    assert_eq!(
        Value::Object(sub.schema.clone()),
        json!({
            "properties": { "TestModel_id": { "type": "integer" } },
            "$id": "objid"
        })
    );
}

#[test]
fn tables_register_in_post_order() {
    let document = json!({
        "$id": "rootid",
        "title": "TestModel",
        "type": "object",
        "properties": {
            "address": {
                "$id": "objid",
                "type": "object",
                "properties": { "street": { "type": "string" } }
            }
        }
    });

    let mut factory = common::RecordingFactory::default();
    let models = common::compile_with(&mut factory, document);
    assert_eq!(factory.created, ["objid", "TestModel"]);
    let keys: Vec<&str> = models.keys().map(String::as_str).collect();
    assert_eq!(keys, ["objid", "TestModel"]);
}

#[test]
fn relations_found_under_embedded_objects_bubble_to_the_enclosing_table() {
    let document = json!({
        "$id": "rootid",
        "title": "Customers",
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "contact": {
                "type": "object",
                "properties": {
                    "phone": { "type": "string" },
                    "address": {
                        "$id": "addressid",
                        "title": "Addresses",
                        "type": "object",
                        "properties": { "street": { "type": "string" } }
                    }
                }
            }
        }
    });

    let models = common::compile_document(document);
    assert_eq!(models.len(), 2);

    let customers = &models["Customers"];
    // The embedded wrapper stays inline, with the stub inserted inside it.
    let contact = common::properties(customers)["contact"]
        .as_object()
        .unwrap();
    let contact_properties = contact["properties"].as_object().unwrap();
    assert!(contact_properties.contains_key("phone"));
    assert!(contact_properties.contains_key("address_id"));
    assert!(!contact_properties.contains_key("address"));

    // The relation lands on the nearest enclosing table, joined through the
    // embedded path.
    let relation = &customers.relations["address"];
    assert_eq!(relation.kind, "BelongsToOne");
    assert_eq!(relation.join.from, "Customers.contact.address_id");
    assert_eq!(relation.join.to, "Addresses.id");
}

#[test]
fn arrays_under_embedded_objects_bubble_their_has_many() {
    let document = json!({
        "$id": "rootid",
        "title": "Projects",
        "type": "object",
        "properties": {
            "meta": {
                "type": "object",
                "properties": {
                    "tags": {
                        "type": "array",
                        "items": {
                            "$id": "tagid",
                            "title": "Tags",
                            "type": "object",
                            "properties": { "label": { "type": "string" } }
                        }
                    }
                }
            }
        }
    });

    let models = common::compile_document(document);
    let projects = &models["Projects"];

    // The array property is removed from the embedded wrapper.
    let meta = common::properties(projects)["meta"].as_object().unwrap();
    assert!(meta["properties"].as_object().unwrap().is_empty());

    let relation = &projects.relations["tags"];
    assert_eq!(relation.kind, "HasMany");
    assert_eq!(relation.join.from, "Projects.id");
    assert_eq!(relation.join.to, "Tags.Projects_id");

    let tags = &models["Tags"];
    assert!(common::properties(tags).contains_key("Projects_id"));
}
