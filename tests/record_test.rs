//! Reading and writing the JSON tree document

use rstest::rstest;

use studycon::domain::ids::is_valid_id;
use studycon::domain::{DegreeCourse, IdGenerator, Level, TaxonomyTree, TreeRecord};
use studycon::util::testing::{self, sample_record, sample_tree};

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

const DOCUMENT: &str = r#"{
  "root": {
    "item": {
      "id": "000000",
      "name": "root",
      "level": "Root",
      "degrees": [],
      "description": "The root node"
    },
    "children": [
      {
        "item": {
          "id": "aaaaaa",
          "name": "Programmieren",
          "level": "L1",
          "degrees": [
            { "degreeCourse": "SE", "value": 2.0 },
            { "degreeCourse": "AC", "value": 0.5 }
          ],
          "description": "Coding"
        },
        "children": [
          {
            "item": {
              "id": "bbbbbb",
              "name": "Sprachen",
              "level": "L2",
              "degrees": null,
              "description": "No Description"
            },
            "children": [
              {
                "item": {
                  "id": "cccccc",
                  "name": "Rust",
                  "level": "L3",
                  "degrees": [{ "degreeCourse": "SE", "value": 3.0 }],
                  "description": "No Description"
                },
                "children": null
              }
            ]
          }
        ]
      },
      {
        "item": {
          "id": "dddddd",
          "name": "Design",
          "level": "L1",
          "degrees": [{ "degreeCourse": "MTD", "value": 1.0 }]
        }
      }
    ]
  }
}"#;

#[test]
fn given_document_when_from_json_then_restores_items_and_order() {
    let tree = TaxonomyTree::from_json_with(DOCUMENT, IdGenerator::seeded(7)).unwrap();

    assert_eq!(tree.len(), 5);
    let names: Vec<&str> = tree.iter().map(|(_, n)| n.item.name.as_str()).collect();
    assert_eq!(names, vec!["root", "Programmieren", "Sprachen", "Rust", "Design"]);

    let p = tree.get_by_id("aaaaaa").unwrap();
    assert_eq!(p.item.level, Level::L1);
    assert_eq!(p.item.description, "Coding");
    assert_eq!(p.item.estimations.value(DegreeCourse::SE), Some(2.0));
    assert_eq!(p.item.estimations.value(DegreeCourse::AC), Some(0.5));
    assert_eq!(p.item.estimations.len(), 2);
}

#[test]
fn given_null_or_missing_fields_when_from_json_then_reads_them_as_empty() {
    let tree = TaxonomyTree::from_json(DOCUMENT).unwrap();

    let sprachen = tree.get_by_name("Sprachen").unwrap();
    assert!(sprachen.item.estimations.is_empty());
    assert!(!tree.get_by_name("Rust").unwrap().has_children());

    let design = tree.get_by_name("Design").unwrap();
    assert!(!design.has_children());
    assert_eq!(design.item.description, "No Description");
}

#[test]
fn given_document_when_from_json_then_restores_parents_and_siblings() {
    let tree = TaxonomyTree::from_json(DOCUMENT).unwrap();
    let programmieren = tree.find_by_id("aaaaaa").unwrap();
    let design = tree.find_by_id("dddddd").unwrap();
    let sprachen = tree.find_by_id("bbbbbb").unwrap();
    let rust = tree.find_by_id("cccccc").unwrap();

    assert_eq!(tree.node(programmieren).unwrap().parent, Some(tree.root()));
    assert_eq!(tree.node(sprachen).unwrap().parent, Some(programmieren));
    assert_eq!(tree.node(rust).unwrap().parent, Some(sprachen));
    assert_eq!(tree.node(programmieren).unwrap().siblings(), &[design]);
    assert_eq!(tree.node(design).unwrap().siblings(), &[programmieren]);
    assert!(tree.node(rust).unwrap().siblings().is_empty());
    assert!(tree.root_node().parent.is_none());
}

#[test]
fn given_document_when_from_json_then_registers_every_id() {
    let tree = TaxonomyTree::from_json(DOCUMENT).unwrap();
    for id in ["000000", "aaaaaa", "bbbbbb", "cccccc", "dddddd"] {
        assert!(tree.contains_id(id), "{id} should be registered");
    }
    assert_eq!(tree.ids().len(), 5);
}

#[test]
fn given_duplicate_and_missing_ids_when_from_json_then_regenerates_them() {
    let json = r#"{"root":{"item":{"id":"000000","name":"root","level":"Root","degrees":[]},
        "children":[
          {"item":{"id":"aaaaaa","name":"A","level":"L1","degrees":[]},"children":[]},
          {"item":{"id":"aaaaaa","name":"B","level":"L1","degrees":[]},"children":[]},
          {"item":{"name":"C","level":"L1","degrees":[]},"children":[]}
        ]}}"#;
    let tree = TaxonomyTree::from_json_with(json, IdGenerator::seeded(3)).unwrap();

    assert_eq!(tree.get_by_id("aaaaaa").unwrap().item.name, "A");
    let b = &tree.get_by_name("B").unwrap().item.id;
    let c = &tree.get_by_name("C").unwrap().item.id;
    assert_ne!(b, "aaaaaa");
    assert!(is_valid_id(b));
    assert!(is_valid_id(c));
    assert_ne!(b, c);
    assert_eq!(tree.ids().len(), 4);
}

#[rstest]
#[case("")]
#[case("{")]
#[case(r#"{"tree": {}}"#)]
#[case(r#"{"root": {"item": {"id": "x", "name": "root", "level": "Top"}}}"#)]
fn given_malformed_document_when_from_json_then_errors(#[case] json: &str) {
    assert!(TaxonomyTree::from_json(json).is_err());
}

#[test]
fn given_tree_when_written_and_read_back_then_structure_is_unchanged() {
    let tree = sample_tree();
    let json = tree.to_json().unwrap();
    assert!(json.contains("\"degreeCourse\""));
    assert!(json.contains("\"degrees\""));

    let back = TaxonomyTree::from_json(&json).unwrap();
    assert_eq!(back.to_record(), sample_record());
}

#[test]
fn given_record_when_serialized_then_uses_wire_field_names() {
    let value = serde_json::to_value(sample_record()).unwrap();
    let first = &value["root"]["children"][0];
    assert_eq!(first["item"]["name"], "Programmieren");
    assert_eq!(first["item"]["level"], "L1");
    assert_eq!(first["item"]["degrees"][0]["degreeCourse"], "SE");
    assert_eq!(first["item"]["degrees"][0]["value"], 2.0);
    assert!(first["children"].is_array());
}

#[test]
fn given_node_when_node_to_json_then_serializes_subtree_only() {
    let tree = sample_tree();
    let design = tree.find_by_name("Design").unwrap();
    let json = tree.node_to_json(design).unwrap();
    let record: studycon::NodeRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(record.item.name, "Design");
    assert_eq!(record.count(), 3);
}

#[test]
fn given_unknown_handle_when_node_to_json_then_errors() {
    let mut tree = sample_tree();
    let java = tree.find_by_name("Java").unwrap();
    assert!(tree.delete_by_name("Java"));
    assert!(tree.node_to_json(java).is_err());
    assert!(tree.subtree_record(java).is_none());
}

#[test]
fn given_wire_record_when_from_record_then_matches_from_json() {
    let record: TreeRecord = serde_json::from_str(DOCUMENT).unwrap();
    let a = TaxonomyTree::from_record(record);
    let b = TaxonomyTree::from_json(DOCUMENT).unwrap();
    assert_eq!(a.to_record(), b.to_record());
}
