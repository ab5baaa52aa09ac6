use std::borrow::Cow;
use std::io;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::core::NodeKind;
use crate::graph::{BipartiteGraph, Projection, WeightTotals};

const GRAPHML_NS: &str = "http://graphml.graphdrawing.org/xmlns";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const SCHEMA_LOCATION: &str =
    "http://graphml.graphdrawing.org/xmlns http://graphml.graphdrawing.org/xmlns/1.0/graphml.xsd";

/// Node keys every document declares; node attributes with these names are
/// written under an `alt_` prefix instead.
const RESERVED_NODE_KEYS: &[&str] = &["type", "label"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDomain {
    Node,
    Edge,
}

impl KeyDomain {
    fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Edge => "edge",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrType {
    String,
    Long,
    Double,
}

impl AttrType {
    fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Long => "long",
            Self::Double => "double",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Str(String),
    Long(u64),
    Double(f64),
}

impl AttrValue {
    fn render(&self) -> String {
        match self {
            Self::Str(value) => xml_safe(value).into_owned(),
            Self::Long(value) => value.to_string(),
            Self::Double(value) => format_double(*value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyId(usize);

impl KeyId {
    fn name(self) -> String {
        format!("d{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct Key {
    domain: KeyDomain,
    name: String,
    ty: AttrType,
}

#[derive(Debug, Clone)]
struct Element {
    source: String,
    target: Option<String>,
    data: Vec<(KeyId, AttrValue)>,
}

/// In-memory GraphML document. Elements render in insertion order.
#[derive(Debug, Clone, Default)]
pub struct GraphMl {
    keys: Vec<Key>,
    nodes: Vec<Element>,
    edges: Vec<Element>,
}

impl GraphMl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&mut self, domain: KeyDomain, name: impl Into<String>, ty: AttrType) -> KeyId {
        self.keys.push(Key {
            domain,
            name: name.into(),
            ty,
        });
        KeyId(self.keys.len() - 1)
    }

    pub fn add_node(&mut self, id: impl Into<String>, data: Vec<(KeyId, AttrValue)>) {
        self.nodes.push(Element {
            source: id.into(),
            target: None,
            data,
        });
    }

    pub fn add_edge(
        &mut self,
        source: impl Into<String>,
        target: impl Into<String>,
        data: Vec<(KeyId, AttrValue)>,
    ) {
        self.edges.push(Element {
            source: source.into(),
            target: Some(target.into()),
            data,
        });
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn render(&self) -> io::Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        self.write_to(&mut writer)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err.to_string()))?;
        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        String::from_utf8(bytes).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }

    fn write_to(&self, writer: &mut Writer<Vec<u8>>) -> quick_xml::Result<()> {
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Start(BytesStart::new("graphml").with_attributes([
            ("xmlns", GRAPHML_NS),
            ("xmlns:xsi", XSI_NS),
            ("xsi:schemaLocation", SCHEMA_LOCATION),
        ])))?;

        for (idx, key) in self.keys.iter().enumerate() {
            let id = KeyId(idx).name();
            let name = xml_safe(&key.name);
            writer.write_event(Event::Empty(BytesStart::new("key").with_attributes([
                ("id", id.as_str()),
                ("for", key.domain.as_str()),
                ("attr.name", name.as_ref()),
                ("attr.type", key.ty.as_str()),
            ])))?;
        }

        writer.write_event(Event::Start(
            BytesStart::new("graph").with_attributes([("edgedefault", "undirected")]),
        ))?;
        for node in &self.nodes {
            let id = xml_safe(&node.source);
            let start = BytesStart::new("node").with_attributes([("id", id.as_ref())]);
            write_element(writer, start, &node.data)?;
        }
        for edge in &self.edges {
            let source = xml_safe(&edge.source);
            let target = xml_safe(edge.target.as_deref().unwrap_or_default());
            let start = BytesStart::new("edge")
                .with_attributes([("source", source.as_ref()), ("target", target.as_ref())]);
            write_element(writer, start, &edge.data)?;
        }
        writer.write_event(Event::End(BytesEnd::new("graph")))?;
        writer.write_event(Event::End(BytesEnd::new("graphml")))?;
        Ok(())
    }
}

fn write_element(
    writer: &mut Writer<Vec<u8>>,
    start: BytesStart<'_>,
    data: &[(KeyId, AttrValue)],
) -> quick_xml::Result<()> {
    if data.is_empty() {
        return writer.write_event(Event::Empty(start));
    }
    let end = start.to_end().into_owned();
    writer.write_event(Event::Start(start))?;
    for (key, value) in data {
        let key = key.name();
        let text = value.render();
        writer.write_event(Event::Start(
            BytesStart::new("data").with_attributes([("key", key.as_str())]),
        ))?;
        writer.write_event(Event::Text(BytesText::new(&text)))?;
        writer.write_event(Event::End(BytesEnd::new("data")))?;
    }
    writer.write_event(Event::End(end))
}

/// Bipartite graph with node `type`/`label`, any extra node attributes, and
/// edge `relation`/`weight`/`patients` plus both conditional probabilities.
pub fn bipartite_document(graph: &BipartiteGraph) -> GraphMl {
    let mut doc = GraphMl::new();
    let type_key = doc.key(KeyDomain::Node, "type", AttrType::String);
    let label_key = doc.key(KeyDomain::Node, "label", AttrType::String);

    let mut extra_names: Vec<&str> = graph
        .nodes()
        .flat_map(|node| node.attributes.keys().map(String::as_str))
        .collect();
    extra_names.sort_unstable();
    extra_names.dedup();
    let extra_keys: Vec<(&str, KeyId)> = extra_names
        .into_iter()
        .map(|name| {
            let key = doc.key(KeyDomain::Node, node_key_name(name), AttrType::String);
            (name, key)
        })
        .collect();

    let relation_key = doc.key(KeyDomain::Edge, "relation", AttrType::String);
    let weight_key = doc.key(KeyDomain::Edge, "weight", AttrType::Long);
    let patients_key = doc.key(KeyDomain::Edge, "patients", AttrType::Long);
    let p_disease_key = doc.key(KeyDomain::Edge, "p_disease_given_drug", AttrType::Double);
    let p_drug_key = doc.key(KeyDomain::Edge, "p_drug_given_disease", AttrType::Double);

    for node in graph.nodes() {
        let mut data = vec![
            (type_key, AttrValue::Str(node.kind.as_str().to_string())),
            (label_key, AttrValue::Str(node.display_name().to_string())),
        ];
        for (name, key) in &extra_keys {
            if let Some(value) = node.attributes.get(*name) {
                data.push((*key, AttrValue::Str(value.clone())));
            }
        }
        doc.add_node(node.id.as_str(), data);
    }

    let totals = WeightTotals::new(graph);
    for assoc in graph.associations() {
        let conditionals = totals.conditionals(assoc);
        doc.add_edge(
            assoc.drug.as_str(),
            assoc.disease.as_str(),
            vec![
                (relation_key, AttrValue::Str("treat".to_string())),
                (weight_key, AttrValue::Long(assoc.weight)),
                (patients_key, AttrValue::Long(assoc.patients)),
                (p_disease_key, AttrValue::Double(conditionals.disease_given_drug)),
                (p_drug_key, AttrValue::Double(conditionals.drug_given_disease)),
            ],
        );
    }

    doc
}

/// Projection graph restricted to nodes that appear in a retained pair.
pub fn projection_document(graph: &BipartiteGraph, projection: &Projection) -> GraphMl {
    let mut doc = GraphMl::new();
    let type_key = doc.key(KeyDomain::Node, "type", AttrType::String);
    let label_key = doc.key(KeyDomain::Node, "label", AttrType::String);
    let shared_key = doc.key(KeyDomain::Edge, "shared_count", AttrType::Long);
    let jaccard_key = doc.key(KeyDomain::Edge, "jaccard", AttrType::Double);

    let kind: NodeKind = projection.kind;
    for id in projection.node_ids() {
        doc.add_node(
            id.as_str(),
            vec![
                (type_key, AttrValue::Str(kind.as_str().to_string())),
                (label_key, AttrValue::Str(graph.display_name(id).to_string())),
            ],
        );
    }

    for edge in &projection.edges {
        doc.add_edge(
            edge.a.as_str(),
            edge.b.as_str(),
            vec![
                (shared_key, AttrValue::Long(edge.shared_count as u64)),
                (jaccard_key, AttrValue::Double(edge.jaccard)),
            ],
        );
    }

    doc
}

pub fn format_double(value: f64) -> String {
    format!("{value:?}")
}

fn node_key_name(attribute: &str) -> String {
    if RESERVED_NODE_KEYS
        .iter()
        .any(|reserved| attribute.eq_ignore_ascii_case(reserved))
    {
        format!("alt_{attribute}")
    } else {
        attribute.to_string()
    }
}

/// Replaces characters XML 1.0 cannot carry, escaped or not, with U+FFFD.
fn xml_safe(value: &str) -> Cow<'_, str> {
    if value.chars().all(is_xml_char) {
        return Cow::Borrowed(value);
    }
    Cow::Owned(
        value
            .chars()
            .map(|ch| if is_xml_char(ch) { ch } else { char::REPLACEMENT_CHARACTER })
            .collect(),
    )
}

fn is_xml_char(ch: char) -> bool {
    matches!(ch, '\t' | '\n' | '\r' | '\u{20}'..='\u{fffd}' | '\u{10000}'..='\u{10ffff}')
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{bipartite_document, format_double, projection_document, xml_safe};
    use crate::core::{Association, Node, NodeId, NodeKind};
    use crate::graph::{build_graph, project};

    fn assoc(drug: &str, disease: &str, weight: u64) -> Association {
        Association::new(NodeId::new(drug), NodeId::new(disease), weight, 1)
    }

    #[test]
    fn control_characters_are_replaced() {
        assert_eq!(xml_safe("a\u{1}b\tc"), "a\u{fffd}b\tc");
        assert_eq!(xml_safe("plain <text>"), "plain <text>");
    }

    #[test]
    fn labels_with_markup_and_control_characters_render_as_valid_xml() {
        let mut nodes = BTreeMap::new();
        let mut asp = Node::bare(NodeId::new("A&B"), NodeKind::Drug);
        asp.name = Some("Bad\u{1}<name>".to_string());
        nodes.insert(asp.id.clone(), asp);
        let graph = build_graph(&nodes, &[assoc("A&B", "FLU", 1)]).expect("build graph");

        let xml = bipartite_document(&graph).render().expect("render");
        assert!(!xml.contains('\u{1}'));
        assert!(xml.contains("<node id=\"A&amp;B\">"));
        assert!(xml.contains("<data key=\"d1\">Bad\u{fffd}&lt;name&gt;</data>"));
        assert!(xml.contains("<edge source=\"A&amp;B\" target=\"FLU\">"));
    }

    #[test]
    fn clashing_node_attributes_get_their_own_key() {
        let mut nodes = BTreeMap::new();
        let mut asp = Node::bare(NodeId::new("ASP"), NodeKind::Drug);
        asp.name = Some("Aspirin".to_string());
        asp.attributes
            .insert("label".to_string(), "ASA tablets".to_string());
        nodes.insert(asp.id.clone(), asp);
        let graph = build_graph(&nodes, &[assoc("ASP", "FLU", 2)]).expect("build graph");

        let xml = bipartite_document(&graph).render().expect("render");
        assert!(xml.contains("<key id=\"d2\" for=\"node\" attr.name=\"alt_label\" attr.type=\"string\"/>"));
        assert!(xml.contains("<data key=\"d1\">Aspirin</data>"));
        assert!(xml.contains("<data key=\"d2\">ASA tablets</data>"));
    }

    #[test]
    fn edges_carry_conditional_probabilities() {
        let graph = build_graph(
            &BTreeMap::new(),
            &[assoc("A", "X", 3), assoc("A", "Y", 1), assoc("B", "X", 1)],
        )
        .expect("build graph");

        let xml = bipartite_document(&graph).render().expect("render");
        assert!(xml.contains("attr.name=\"p_disease_given_drug\" attr.type=\"double\""));
        // A-X: 3 of A's 4, 3 of X's 4.
        assert!(xml.contains("<data key=\"d5\">0.75</data>"));
        assert!(xml.contains("<data key=\"d6\">0.75</data>"));
    }

    #[test]
    fn doubles_keep_a_decimal_point() {
        assert_eq!(format_double(1.0), "1.0");
        assert_eq!(format_double(0.5), "0.5");
    }

    #[test]
    fn bipartite_document_declares_keys_and_weights() {
        let mut nodes = BTreeMap::new();
        let mut asp = Node::bare(NodeId::new("ASP"), NodeKind::Drug);
        asp.name = Some("Aspirin & co".to_string());
        asp.attributes
            .insert("aliases".to_string(), "ASA".to_string());
        nodes.insert(asp.id.clone(), asp);
        let graph = build_graph(&nodes, &[assoc("ASP", "FLU", 8)]).expect("build graph");

        let doc = bipartite_document(&graph);
        assert_eq!(doc.node_count(), 2);
        assert_eq!(doc.edge_count(), 1);

        let xml = doc.render().expect("render");
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<graphml"));
        assert!(xml.contains("<key id=\"d2\" for=\"node\" attr.name=\"aliases\" attr.type=\"string\"/>"));
        assert!(xml.contains("<key id=\"d4\" for=\"edge\" attr.name=\"weight\" attr.type=\"long\"/>"));
        assert!(xml.contains("<data key=\"d1\">Aspirin &amp; co</data>"));
        assert!(xml.contains("<edge source=\"ASP\" target=\"FLU\">"));
        assert!(xml.contains("<data key=\"d4\">8</data>"));
        assert!(xml.trim_end().ends_with("</graphml>"));
    }

    #[test]
    fn projection_document_only_holds_paired_nodes() {
        let graph = build_graph(
            &BTreeMap::new(),
            &[
                assoc("A", "X", 1),
                assoc("A", "Y", 1),
                assoc("B", "X", 1),
                assoc("B", "Y", 1),
                assoc("C", "Z", 1),
            ],
        )
        .expect("build graph");
        let projection = project(&graph, NodeKind::Drug, 2);

        let doc = projection_document(&graph, &projection);
        assert_eq!(doc.node_count(), 2);
        assert_eq!(doc.edge_count(), 1);
        let xml = doc.render().expect("render");
        assert!(xml.contains("<data key=\"d3\">1.0</data>"));
        assert!(!xml.contains("node id=\"C\""));
    }
}
