use std::collections::HashSet;
use std::path::Path;

use famtree::config::{Config, LayoutConfig};
use famtree::import::{convert_flat, parse_flat};
use famtree::layout::{FamilyLayout, NodeRole};
use famtree::parser::parse_family;
use famtree::theme::Theme;
use famtree::{DefaultNodeRenderer, PersonRecord, compute_layout, render_svg};

fn assert_valid_svg(svg: &str, fixture: &str) {
    assert!(svg.contains("<svg"), "{fixture}: missing <svg tag");
    assert!(svg.contains("</svg>"), "{fixture}: missing </svg tag");
    assert!(!svg.contains("NaN"), "{fixture}: NaN coordinate in output");
}

fn config() -> Config {
    Config {
        theme: Theme::modern(),
        layout: LayoutConfig {
            fast_text_metrics: true,
            ..LayoutConfig::default()
        },
        ..Config::default()
    }
}

fn fixture_path(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Fixtures named `flat_*` hold flat parent-by-id records.
fn load_forest(name: &str) -> Vec<PersonRecord> {
    let input = std::fs::read_to_string(fixture_path(name)).expect("fixture read failed");
    if name.starts_with("flat_") {
        convert_flat(&parse_flat(&input).expect("flat parse failed")).expect("flat convert failed")
    } else {
        parse_family(&input).expect("parse failed")
    }
}

fn layout_fixture(name: &str) -> FamilyLayout {
    let config = config();
    compute_layout(&load_forest(name), &config.theme, &config.layout).expect("layout failed")
}

fn assert_layout_invariants(layout: &FamilyLayout, fixture: &str) {
    let mut seen = HashSet::new();
    for node in &layout.nodes {
        assert!(seen.insert(node.id.as_str()), "{fixture}: duplicate node id `{}`", node.id);
        assert!(node.x.is_finite() && node.y.is_finite(), "{fixture}: non-finite position");
        assert_eq!(node.hidden, node.role != NodeRole::Person, "{fixture}: hidden flag");
        if node.hidden {
            assert_eq!((node.width, node.height), (0.0, 0.0), "{fixture}: hidden node has a size");
        } else {
            assert_eq!(node.width, layout.node_width, "{fixture}: width of `{}`", node.id);
            assert_eq!(node.height, layout.node_height, "{fixture}: height of `{}`", node.id);
        }
    }
    assert_eq!(
        layout.nodes.iter().filter(|node| node.role == NodeRole::Root).count(),
        1,
        "{fixture}: exactly one super-root"
    );

    for union in &layout.unions {
        assert_eq!(
            union.union_point.x,
            (union.source_point.x + union.target_point.x) / 2.0,
            "{fixture}: union `{}` not centered between `{}` and `{}`",
            union.union,
            union.source,
            union.target
        );
        assert_eq!(union.points.len(), 6, "{fixture}: union path length");
    }

    for link in &layout.links {
        if link.suppressed {
            assert!(link.points.iter().all(|p| p.x == 0.0 && p.y == 0.0));
        } else {
            assert_eq!(link.points.len(), 3, "{fixture}: elbow path length");
        }
    }

    assert_rows_separated(layout, fixture);
}

/// Visible boxes sharing a row keep at least the visible separation.
fn assert_rows_separated(layout: &FamilyLayout, fixture: &str) {
    let min_gap = config().layout.visible_separation * 2.0 * layout.node_width;
    let mut visible: Vec<_> = layout.visible_nodes().collect();
    visible.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));
    for pair in visible.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if a.y != b.y {
            continue;
        }
        assert!(
            b.x - a.x >= min_gap - 1e-9,
            "{fixture}: `{}` at x={} crowds `{}` at x={}",
            a.id,
            a.x,
            b.id,
            b.x
        );
    }
}

/// Distinct explicit ids and anonymous records reachable through lineage
/// and marriages.
fn census(persons: &[PersonRecord], ids: &mut HashSet<String>, anonymous: &mut usize) {
    for person in persons {
        match &person.id {
            Some(id) => {
                ids.insert(id.clone());
            }
            None => *anonymous += 1,
        }
        census(&person.children, ids, anonymous);
        for marriage in &person.marriages {
            if let Some(spouse) = marriage.spouse.as_deref() {
                match &spouse.id {
                    Some(id) => {
                        ids.insert(id.clone());
                    }
                    None => *anonymous += 1,
                }
            }
            census(&marriage.children, ids, anonymous);
        }
    }
}

fn assert_one_node_per_person(forest: &[PersonRecord], layout: &FamilyLayout, fixture: &str) {
    let mut ids = HashSet::new();
    let mut anonymous = 0;
    census(forest, &mut ids, &mut anonymous);
    assert_eq!(
        layout.visible_nodes().count(),
        ids.len() + anonymous,
        "{fixture}: person nodes vs distinct people"
    );
}

#[test]
fn render_all_fixtures() {
    let config = config();
    let mut fixtures: Vec<String> = Vec::new();

    // Keep this list explicit so new scenarios must be added intentionally.
    let candidates = [
        "single.json",
        "couple.json",
        "remarriage.json",
        "shared_ancestor.json",
        "inlaw.json",
        "divorced.json",
        "flat_family.json",
    ];
    for name in candidates {
        assert!(fixture_path(name).exists(), "missing fixture {name}");
        fixtures.push(name.to_string());
    }

    for fixture in fixtures {
        let layout = layout_fixture(&fixture);
        assert_layout_invariants(&layout, &fixture);
        assert_one_node_per_person(&load_forest(&fixture), &layout, &fixture);
        let svg = render_svg(&layout, &config.theme, &config, &DefaultNodeRenderer)
            .unwrap_or_else(|err| panic!("{fixture}: render failed: {err}"));
        assert_valid_svg(&svg, &fixture);
        for node in layout.visible_nodes() {
            assert!(
                svg.contains(&format!("data-id=\"{}\"", node.id)),
                "{fixture}: node `{}` not drawn",
                node.id
            );
        }
    }
}

#[test]
fn single_person_has_no_unions() {
    let layout = layout_fixture("single.json");
    assert_eq!(layout.nodes.len(), 2);
    assert!(layout.unions.is_empty());
    let pat = layout.node("pat").unwrap();
    assert!(pat.no_parent);
    assert_eq!(pat.extra.as_ref().unwrap()["born"], 1950);
    assert!(layout.links.iter().all(|link| link.suppressed));
}

#[test]
fn couple_is_centered_over_children() {
    let layout = layout_fixture("couple.json");
    assert_eq!(layout.unions.len(), 1);
    let union = &layout.unions[0];
    assert_eq!((union.source.as_str(), union.target.as_str(), union.ordinal), ("john", "jane", 0));

    let john = layout.node("john").unwrap();
    let jane = layout.node("jane").unwrap();
    let marriage = layout.node(&union.union).unwrap();
    assert_eq!(john.y, jane.y);
    assert_eq!(marriage.x, (john.x + jane.x) / 2.0);
    let dx = 2.0 * layout.node_width;
    assert!(
        jane.x - john.x >= 0.6 * dx - 1e-9,
        "spouses too close: john {} jane {}",
        john.x,
        jane.x
    );

    let ann = layout.node("ann").unwrap();
    let bob = layout.node("bob").unwrap();
    assert!(ann.y > john.y);
    assert_eq!(ann.y, bob.y);
    assert!(ann.x.min(bob.x) < marriage.x && marriage.x < ann.x.max(bob.x));
    assert!(!ann.no_parent);
}

#[test]
fn remarriage_rows_stack_by_ordinal() {
    let layout = layout_fixture("remarriage.json");
    let ordinals: Vec<usize> = layout.unions.iter().map(|u| u.ordinal).collect();
    assert_eq!(ordinals, vec![0, 1]);
    let first_row = layout.unions[0].points[2].y;
    let second_row = layout.unions[1].points[2].y;
    assert!((first_row - second_row - 0.55 * layout.node_height).abs() < 1e-9);
}

#[test]
fn shared_descendants_are_drawn_once() {
    let layout = layout_fixture("shared_ancestor.json");
    for id in ["d", "g"] {
        assert_eq!(layout.nodes.iter().filter(|node| node.id == id).count(), 1, "`{id}` duplicated");
    }
    let diana_links: Vec<_> = layout.links.iter().filter(|link| link.target == "d").collect();
    assert_eq!(diana_links.len(), 1);
    let frances_union = layout.unions.iter().find(|u| u.target == "f").unwrap();
    assert_eq!(diana_links[0].source, frances_union.union);
    assert!(!diana_links[0].suppressed);

    let george_links: Vec<_> = layout.links.iter().filter(|link| link.target == "g").collect();
    assert_eq!(george_links.len(), 1);
    let diana_union = layout.unions.iter().find(|u| u.target == "d").unwrap();
    assert_eq!(george_links[0].source, diana_union.union);
}

#[test]
fn in_law_spouse_shares_the_row() {
    let layout = layout_fixture("inlaw.json");
    let junctions: Vec<_> = layout
        .nodes
        .iter()
        .filter(|node| node.role == NodeRole::InLawJunction)
        .collect();
    assert_eq!(junctions.len(), 1);
    assert!(junctions[0].hidden);

    let charlie = layout.node("charlie").unwrap();
    let sue = layout.node("sue").unwrap();
    let lucy = layout.node("lucy").unwrap();
    assert_eq!(charlie.y, sue.y);
    assert_eq!(charlie.y, lucy.y);
    assert!(layout.nodes.iter().any(|node| node.name == "Tim" && node.y > charlie.y));
}

#[test]
fn divorced_unions_keep_geometry_and_get_dashed() {
    let config = config();
    let layout = layout_fixture("divorced.json");
    let divorced: Vec<_> = layout.unions.iter().filter(|u| u.divorced).collect();
    assert_eq!(divorced.len(), 2);
    assert_eq!(layout.unions.len(), 3);

    let svg = render_svg(&layout, &config.theme, &config, &DefaultNodeRenderer).unwrap();
    assert_eq!(svg.matches("class=\"marriage divorced\"").count(), 2);
    assert_eq!(svg.matches("stroke-dasharray=\"6 4\"").count(), 2);
}

#[test]
fn flat_records_import_as_one_family() {
    let layout = layout_fixture("flat_family.json");
    assert_eq!(layout.visible_nodes().count(), 7);
    assert_eq!(layout.unions.len(), 2);
    let walter = layout.node("1").unwrap();
    assert_eq!(walter.class_name, "man");
    let susan = layout.node("5").unwrap();
    assert_eq!(susan.class_name, "woman");
    assert!(susan.y > walter.y);
}
