//! The renderer: turns a well-formed chain plus its conditions into a
//! Cypher string and a parameter map, per the MATCH/WITH/WHERE/RETURN
//! contract.

use std::collections::HashSet;

use crate::algebra::Context as LowerContext;
use crate::allocator::NameAllocator;
use crate::chain::{Direction, Hops, Segment};
use crate::conditions::{Condition, ExistenceKind};
use crate::errors::NeopathResult;
use crate::value::Value;

/// The query string plus the parameter map collected while rendering it.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub query: String,
    pub params: Vec<(String, Value)>,
}

enum Resolved {
    Node {
        var: String,
        inline: String,
        direction: Direction,
    },
    Edge {
        var: String,
        inline: String,
        hops: Hops,
    },
    /// A variable-length edge: its own variable is never rendered or
    /// returned — `edges_var`/`nodes_var` stand in for it everywhere.
    HopsEdge {
        edges_var: String,
        nodes_var: String,
        path_var: String,
        hops: Hops,
    },
}

impl Resolved {
    fn result_tokens(&self) -> Vec<String> {
        match self {
            Resolved::Node { var, .. } => vec![var.clone()],
            Resolved::Edge { var, .. } => vec![var.clone()],
            Resolved::HopsEdge {
                edges_var,
                nodes_var,
                ..
            } => vec![edges_var.clone(), nodes_var.clone()],
        }
    }

    /// The variable a condition attached to this segment is rendered
    /// against. For a variable-length edge, that is its path variable —
    /// the only name the segment itself owns.
    fn condition_var(&self) -> &str {
        match self {
            Resolved::Node { var, .. } => var,
            Resolved::Edge { var, .. } => var,
            Resolved::HopsEdge { path_var, .. } => path_var,
        }
    }
}

pub fn render(segments: &[Segment], conditions: &[(usize, Condition)]) -> NeopathResult<Rendered> {
    tracing::debug!(
        segment_count = segments.len(),
        condition_count = conditions.len(),
        "rendering query"
    );

    let reserved: HashSet<String> = segments
        .iter()
        .filter_map(|s| s.user_var())
        .filter(|v| v.starts_with('_'))
        .map(|v| v.to_string())
        .collect();
    let mut alloc = NameAllocator::new(reserved);

    let mut resolved = Vec::with_capacity(segments.len());
    for segment in segments {
        resolved.push(resolve_segment(segment, &mut alloc)?);
    }

    let mut params = Vec::new();
    let match_section = render_match(&resolved);
    let with_section = render_with(&resolved);
    let where_section = render_where(conditions, &resolved, &mut alloc, &mut params)?;
    let return_section = render_return(&resolved);

    let mut sections = vec![match_section];
    if let Some(with) = with_section {
        sections.push(with);
    }
    if let Some(where_clause) = where_section {
        sections.push(where_clause);
    }
    sections.push(return_section);

    let rendered = Rendered {
        query: sections.join("\n"),
        params,
    };
    tracing::debug!(query = %rendered.query, "rendered query");
    Ok(rendered)
}

fn resolve_segment(segment: &Segment, alloc: &mut NameAllocator) -> NeopathResult<Resolved> {
    match segment {
        Segment::Node(node) => {
            let var = node
                .var
                .clone()
                .unwrap_or_else(|| alloc.next_var());
            let lowered = node.ident.lower(&var, LowerContext::Node)?;
            Ok(Resolved::Node {
                var,
                inline: lowered.inline,
                direction: node.direction,
            })
        }
        Segment::Edge(edge) if edge.hops.is_present() => {
            // Allocation order within a hops triple is edges, then nodes,
            // then path — matching the source's observable output, not
            // its prose ("path, edges, nodes").
            let edges_var = alloc.next_var();
            let nodes_var = alloc.next_var();
            let path_var = alloc.next_var();
            Ok(Resolved::HopsEdge {
                edges_var,
                nodes_var,
                path_var,
                hops: edge.hops,
            })
        }
        Segment::Edge(edge) => {
            let var = edge
                .var
                .clone()
                .unwrap_or_else(|| alloc.next_var());
            let lowered = edge.ident.lower(&var, LowerContext::Edge)?;
            Ok(Resolved::Edge {
                var,
                inline: lowered.inline,
                hops: edge.hops,
            })
        }
    }
}

fn render_match(resolved: &[Resolved]) -> String {
    if resolved.len() == 1 {
        let Resolved::Node { var, inline, .. } = &resolved[0] else {
            unreachable!("a length-1 chain is always a single node segment");
        };
        return format!("MATCH ({var}{inline})");
    }

    let mut triples = Vec::new();
    let mut i = 0;
    while i + 2 < resolved.len() {
        triples.push(render_triple(&resolved[i], &resolved[i + 1], &resolved[i + 2]));
        i += 2;
    }
    format!("MATCH {}", triples.join(",\n      "))
}

fn render_triple(start: &Resolved, edge: &Resolved, end: &Resolved) -> String {
    let (start_var, start_inline) = match start {
        Resolved::Node { var, inline, .. } => (var.as_str(), inline.as_str()),
        _ => unreachable!("chain segments alternate node, edge, node"),
    };
    let (end_var, end_inline, direction) = match end {
        Resolved::Node {
            var,
            inline,
            direction,
        } => (var.as_str(), inline.as_str(), *direction),
        _ => unreachable!("chain segments alternate node, edge, node"),
    };

    let (left_arrow, right_arrow) = match direction {
        Direction::None => ("", ""),
        Direction::Left => ("<", ""),
        Direction::Right => ("", ">"),
    };

    let (path_prefix, edge_bracket) = match edge {
        Resolved::Edge { var, inline, hops } => {
            let shape = hops.shape();
            ("".to_string(), format!("{var}{inline}{shape}"))
        }
        Resolved::HopsEdge {
            path_var, hops, ..
        } => (format!("{path_var} = "), hops.shape()),
        Resolved::Node { .. } => unreachable!("chain segments alternate node, edge, node"),
    };

    format!(
        "{path_prefix}({start_var}{start_inline}){left_arrow}-[{edge_bracket}]-{right_arrow}({end_var}{end_inline})"
    )
}

fn render_with(resolved: &[Resolved]) -> Option<String> {
    let items: Vec<String> = resolved
        .iter()
        .filter_map(|r| match r {
            Resolved::HopsEdge {
                edges_var,
                nodes_var,
                path_var,
                ..
            } => Some(format!(
                "relationships({path_var}) AS {edges_var}, nodes({path_var})[1..-1] AS {nodes_var}"
            )),
            _ => None,
        })
        .collect();

    if items.is_empty() {
        None
    } else {
        Some(format!("WITH *, {}", items.join(",\n        ")))
    }
}

fn render_where(
    conditions: &[(usize, Condition)],
    resolved: &[Resolved],
    alloc: &mut NameAllocator,
    params: &mut Vec<(String, Value)>,
) -> NeopathResult<Option<String>> {
    if conditions.is_empty() {
        return Ok(None);
    }

    let mut items = Vec::with_capacity(conditions.len());
    for (index, condition) in conditions {
        let var = resolved[*index].condition_var();
        items.push(render_condition(condition, var, alloc, params)?);
    }
    Ok(Some(format!("WHERE {}", items.join("\n  AND "))))
}

fn render_condition(
    condition: &Condition,
    var: &str,
    alloc: &mut NameAllocator,
    params: &mut Vec<(String, Value)>,
) -> NeopathResult<String> {
    Ok(match condition {
        Condition::Raw(fragment) => fragment.clone(),
        Condition::Existence { prop, kind } => match kind {
            ExistenceKind::Exists => format!("exists({var}.{})", prop.prop_name),
            ExistenceKind::IsNull => format!("{var}.{} IS NULL", prop.prop_name),
        },
        Condition::Compare { prop, op, value } => {
            let name = alloc.next_param();
            let rendered = format!("{var}.{} {} ${name}", prop.prop_name, op.symbol());
            params.push((name, value.clone()));
            rendered
        }
        Condition::Not(inner) => {
            format!("NOT ({})", render_condition(inner, var, alloc, params)?)
        }
    })
}

fn render_return(resolved: &[Resolved]) -> String {
    let mut tokens: Vec<String> = resolved.iter().flat_map(|r| r.result_tokens()).collect();
    tokens.sort();
    tokens.dedup();
    format!("RETURN {}", tokens.join(", "))
}
