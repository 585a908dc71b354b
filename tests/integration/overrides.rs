//! The override annotation surface.

use serde_json::json;
use tablefold::compile;

use crate::common;

#[test]
fn naming_overrides_replace_every_derived_name() {
    let document = json!({
        "$id": "./people",
        "title": "People",
        "type": "object",
        "tablefold-table-name": "persons",
        "tablefold-model-name": "Person",
        "tablefold-id-column": "person_id",
        "properties": {
            "name": { "type": "string" },
            "pets": {
                "type": "array",
                "items": {
                    "$id": "./pets",
                    "title": "Pets",
                    "type": "object",
                    "properties": { "species": { "type": "string" } }
                }
            }
        }
    });

    let models = common::compile_document(document);
    assert!(models.contains_key("Person"));
    assert!(!models.contains_key("People"));

    let person = &models["Person"];
    assert_eq!(person.table_name, "persons");
    assert_eq!(person.id_column, "person_id");
    // Annotations never leak into the emitted schema.
    assert!(person.schema.keys().all(|key| !key.starts_with("tablefold-")));

    // The overridden identity drives both join sides and the synthesized
    // column name.
    let relation = &person.relations["pets"];
    assert_eq!(relation.join.from, "persons.person_id");
    assert_eq!(relation.join.to, "Pets.persons_person_id");
    assert!(common::properties(&models["Pets"]).contains_key("persons_person_id"));
}

#[test]
fn id_column_override_drives_belongs_to_one_targets() {
    let document = json!({
        "$id": "./orders",
        "title": "Orders",
        "type": "object",
        "properties": {
            "customer": {
                "$id": "./customers",
                "title": "Customers",
                "type": "object",
                "tablefold-id-column": "customer_no",
                "properties": { "name": { "type": "string" } }
            }
        }
    });

    let models = common::compile_document(document);
    let relation = &models["Orders"].relations["customer"];
    assert_eq!(relation.join.from, "Orders.customer_id");
    assert_eq!(relation.join.to, "Customers.customer_no");
}

#[test]
fn join_to_column_override_is_used_verbatim_without_synthesis() {
    let document = json!({
        "$id": "./owners",
        "title": "Owners",
        "type": "object",
        "properties": {
            "houses": {
                "type": "array",
                "tablefold-join-to-column": "Houses.owner_ref",
                "items": {
                    "$id": "./houses",
                    "title": "Houses",
                    "type": "object",
                    "properties": { "street": { "type": "string" } }
                }
            }
        }
    });

    let models = common::compile_document(document);
    let relation = &models["Owners"].relations["houses"];
    assert_eq!(relation.join.from, "Owners.id");
    assert_eq!(relation.join.to, "Houses.owner_ref");
    assert!(relation.join.through.is_none());

    // No column is synthesized when the join target is explicit.
    assert_eq!(common::property_names(&models["Houses"]), ["street"]);
}

#[test]
fn join_through_records_the_intermediate_table() -> anyhow::Result<()> {
    let document = json!({
        "$id": "./people",
        "title": "People",
        "type": "object",
        "properties": {
            "memberships": {
                "type": "array",
                "items": {
                    "$id": "./memberships",
                    "title": "Memberships",
                    "type": "object",
                    "properties": {
                        "person_id": { "type": "integer" },
                        "group_id": { "type": "integer" }
                    }
                }
            },
            "groups": {
                "type": "array",
                "tablefold-join-through": {
                    "from": "Memberships.person_id",
                    "to": "Memberships.group_id"
                },
                "items": {
                    "$id": "./groups",
                    "title": "Groups",
                    "type": "object",
                    "properties": { "name": { "type": "string" } }
                }
            }
        }
    });

    common::init_logging();
    let mut factory = common::RecordingFactory::default();
    let models = compile(&mut factory, document)?;

    let relation = &models["People"].relations["groups"];
    assert_eq!(relation.kind, "HasMany");
    assert_eq!(relation.join.from, "People.id");
    assert_eq!(relation.join.to, "Groups.id");

    let through = relation.join.through.as_ref().expect("through is recorded");
    assert_eq!(through.from, "Memberships.person_id");
    assert_eq!(through.to, "Memberships.group_id");

    // A mediated relation synthesizes nothing on the target.
    assert_eq!(common::property_names(&models["Groups"]), ["name"]);
    Ok(())
}
