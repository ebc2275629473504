use crate::layout::{FamilyLayout, NodeRole};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Flat, diff-friendly view of a computed layout.
#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub node_width: f64,
    pub node_height: f64,
    pub width: f64,
    pub height: f64,
    pub nodes: Vec<NodeDump>,
    pub links: Vec<LinkDump>,
    pub unions: Vec<UnionDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub name: String,
    pub role: NodeRole,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub hidden: bool,
    pub no_parent: bool,
    pub class_name: String,
}

#[derive(Debug, Serialize)]
pub struct LinkDump {
    pub source: String,
    pub target: String,
    pub suppressed: bool,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Serialize)]
pub struct UnionDump {
    pub source: String,
    pub target: String,
    pub ordinal: usize,
    pub union: String,
    pub divorced: bool,
    pub points: Vec<[f64; 2]>,
}

impl LayoutDump {
    pub fn from_layout(layout: &FamilyLayout) -> Self {
        let nodes = layout
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id.clone(),
                name: node.name.clone(),
                role: node.role,
                x: node.x,
                y: node.y,
                width: node.width,
                height: node.height,
                hidden: node.hidden,
                no_parent: node.no_parent,
                class_name: node.class_name.clone(),
            })
            .collect();

        let links = layout
            .links
            .iter()
            .map(|link| LinkDump {
                source: link.source.clone(),
                target: link.target.clone(),
                suppressed: link.suppressed,
                points: link.points.iter().map(|p| [p.x, p.y]).collect(),
            })
            .collect();

        let unions = layout
            .unions
            .iter()
            .map(|union| UnionDump {
                source: union.source.clone(),
                target: union.target.clone(),
                ordinal: union.ordinal,
                union: union.union.clone(),
                divorced: union.divorced,
                points: union.points.iter().map(|p| [p.x, p.y]).collect(),
            })
            .collect();

        LayoutDump {
            node_width: layout.node_width,
            node_height: layout.node_height,
            width: layout.bounds.width(),
            height: layout.bounds.height(),
            nodes,
            links,
            unions,
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &FamilyLayout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
