// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The graph→plan compiler shared by the graph-derived strategies.
//!
//! Given a bound `(source, sink)` pair, walk data edges backward from the
//! sink, collect the reachable subgraph, and lower it onto the closed
//! [`LiteOp`] set. Control dependencies are ignored entirely; `Identity`
//! nodes are elided through an alias map.
//!
//! Everything that can go wrong here is an endpoint-binding failure:
//! unresolvable or colliding names, a second placeholder reachable inside
//! the boundary, or an operation the execution engine does not support.

use crate::ConvertError;
use graph_ir::{AttrValue, GraphModel, Node};
use lite_artifact::{LiteOp, LitePlan, Padding, TensorSpec};
use std::collections::{HashMap, HashSet};
use tensor_meta::{ConstTensor, DType, TensorShape};

/// Operation kinds treated as external input slots by the compiler.
const PLACEHOLDER_OPS: [&str; 2] = ["Placeholder", "PlaceholderWithDefault"];

/// Default input descriptor when a placeholder declares no shape: one
/// grayscale NHWC image of unspecified extent.
const DEFAULT_INPUT_SHAPE: [i64; 4] = [1, -1, -1, 1];

fn bind_err(detail: impl Into<String>) -> ConvertError {
    ConvertError::EndpointBindingFailed {
        detail: detail.into(),
    }
}

/// Compiles the subgraph between `source` and `sink` into a checked plan.
pub fn compile_subgraph(
    graph: &GraphModel,
    source: &str,
    sink: &str,
) -> Result<LitePlan, ConvertError> {
    for name in [source, sink] {
        if graph.is_duplicate(name) {
            return Err(bind_err(format!("node name '{name}' collides")));
        }
        if !graph.contains(name) {
            return Err(bind_err(format!("node '{name}' not present in graph")));
        }
    }
    if source == sink {
        return Err(bind_err("source and sink are the same node"));
    }

    let order = topo_from_sink(graph, source, sink)?;
    if !order.iter().any(|n| n.name == source) {
        return Err(bind_err(format!(
            "sink '{sink}' does not depend on source '{source}'",
        )));
    }

    let source_node = graph.node(source).ok_or_else(|| bind_err("lost source"))?;
    let input_shape = source_node
        .shape_attr()
        .cloned()
        .unwrap_or_else(|| TensorShape::from_signed(&DEFAULT_INPUT_SHAPE));
    let input_dtype = source_node.dtype_attr().unwrap_or(DType::F32);

    let mut consts: HashMap<String, ConstTensor> = HashMap::new();
    let mut aliases: HashMap<String, String> = HashMap::new();
    let mut ops: Vec<LiteOp> = Vec::new();

    let resolve = |aliases: &HashMap<String, String>, name: &str| -> String {
        aliases.get(name).cloned().unwrap_or_else(|| name.to_string())
    };

    for node in &order {
        if node.name == source {
            continue;
        }
        if PLACEHOLDER_OPS.contains(&node.op.as_str()) {
            return Err(bind_err(format!(
                "second input slot '{}' reachable inside the bound subgraph",
                node.name,
            )));
        }

        match node.op.as_str() {
            "Const" => {
                consts.insert(node.name.clone(), const_payload(graph, node)?);
            }
            "Identity" => {
                let target = single_input(node)?;
                let resolved = resolve(&aliases, &target);
                aliases.insert(node.name.clone(), resolved);
            }
            "Conv2D" => {
                let (x, w) = binary_inputs(node)?;
                let weights = resolve(&aliases, &w);
                require_const(&consts, node, &weights)?;
                ops.push(LiteOp::Conv2d {
                    name: node.name.clone(),
                    input: resolve(&aliases, &x),
                    weights,
                    bias: None,
                    stride: stride_attr(node)?,
                    padding: padding_attr(node),
                    output: node.name.clone(),
                });
            }
            "Conv2DBackpropInput" | "Conv2DTranspose" => {
                // The frozen form carries (output_sizes, filter, x); the
                // direct form carries (x, filter).
                let data: Vec<String> = node.data_inputs().map(str::to_string).collect();
                let (x, w) = match (node.op.as_str(), data.as_slice()) {
                    ("Conv2DBackpropInput", [_sizes, filter, x]) => (x.clone(), filter.clone()),
                    ("Conv2DTranspose", [x, filter]) => (x.clone(), filter.clone()),
                    _ => {
                        return Err(bind_err(format!(
                            "'{}' ({}) has unexpected arity {}",
                            node.name,
                            node.op,
                            data.len(),
                        )));
                    }
                };
                let weights = resolve(&aliases, &w);
                require_const(&consts, node, &weights)?;
                ops.push(LiteOp::Conv2dTranspose {
                    name: node.name.clone(),
                    input: resolve(&aliases, &x),
                    weights,
                    bias: None,
                    stride: stride_attr(node)?,
                    output: node.name.clone(),
                });
            }
            "BiasAdd" => {
                let (x, b) = binary_inputs(node)?;
                let bias = resolve(&aliases, &b);
                require_const(&consts, node, &bias)?;
                ops.push(LiteOp::BiasAdd {
                    name: node.name.clone(),
                    input: resolve(&aliases, &x),
                    bias,
                    output: node.name.clone(),
                });
            }
            "Add" | "AddV2" => {
                let (a, b) = binary_inputs(node)?;
                let ra = resolve(&aliases, &a);
                let rb = resolve(&aliases, &b);
                match (consts.contains_key(&ra), consts.contains_key(&rb)) {
                    (false, false) => ops.push(LiteOp::Add {
                        name: node.name.clone(),
                        lhs: ra,
                        rhs: rb,
                        output: node.name.clone(),
                    }),
                    (false, true) | (true, false) => {
                        let (input, bias) = if consts.contains_key(&rb) {
                            (ra, rb)
                        } else {
                            (rb, ra)
                        };
                        if consts[&bias].shape.len() > 1 {
                            return Err(bind_err(format!(
                                "'{}' adds a rank-{} constant; only per-channel biases are supported",
                                node.name,
                                consts[&bias].shape.len(),
                            )));
                        }
                        ops.push(LiteOp::BiasAdd {
                            name: node.name.clone(),
                            input,
                            bias,
                            output: node.name.clone(),
                        });
                    }
                    (true, true) => {
                        return Err(bind_err(format!(
                            "'{}' adds two constants; constant folding is not supported",
                            node.name,
                        )));
                    }
                }
            }
            "Relu" => {
                let x = single_input(node)?;
                ops.push(LiteOp::Relu {
                    name: node.name.clone(),
                    input: resolve(&aliases, &x),
                    output: node.name.clone(),
                });
            }
            "MaxPool" => {
                let x = single_input(node)?;
                ops.push(LiteOp::MaxPool2d {
                    name: node.name.clone(),
                    input: resolve(&aliases, &x),
                    kernel: ksize_attr(node)?,
                    stride: stride_attr(node)?,
                    output: node.name.clone(),
                });
            }
            other => {
                return Err(bind_err(format!(
                    "unsupported op '{other}' ('{}') reachable between endpoints",
                    node.name,
                )));
            }
        }
    }

    let output_name = resolve(&aliases, sink);
    if consts.contains_key(&output_name) {
        return Err(bind_err(format!("sink '{sink}' resolves to a constant")));
    }

    // Drop constants nothing ended up referencing (e.g. the output-sizes
    // operand of a backprop-input node).
    let used: HashSet<String> = ops
        .iter()
        .flat_map(|o| o.const_refs().into_iter().map(str::to_string))
        .collect();
    consts.retain(|k, _| used.contains(k));

    // Provisional rank-4 dynamic output spec: every supported op preserves
    // rank 4, and the checker computes the real shape below.
    let mut plan = LitePlan::new(
        graph.name.clone(),
        TensorSpec::new(source, input_shape, input_dtype),
        TensorSpec::new(
            output_name,
            TensorShape::from_signed(&[-1, -1, -1, -1]),
            input_dtype,
        ),
        ops,
        consts,
    );

    let computed = plan
        .check()
        .map_err(|e| bind_err(format!("compiled plan failed checking: {e}")))?;
    plan.output.shape = computed;

    tracing::debug!("compiled '{}': {}", graph.name, plan.summary());
    Ok(plan)
}

/// Backward reachability from the sink over data edges, returned in
/// topological (inputs-first) order. Expansion stops at the source.
fn topo_from_sink<'g>(
    graph: &'g GraphModel,
    source: &str,
    sink: &str,
) -> Result<Vec<&'g Node>, ConvertError> {
    enum Phase {
        Enter,
        Exit,
    }

    let sink_node = graph
        .node(sink)
        .ok_or_else(|| bind_err(format!("node '{sink}' not present in graph")))?;

    let mut order = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut in_progress: HashSet<&str> = HashSet::new();
    let mut stack: Vec<(&Node, Phase)> = vec![(sink_node, Phase::Enter)];

    while let Some((node, phase)) = stack.pop() {
        match phase {
            Phase::Enter => {
                let name = node.name.as_str();
                if visited.contains(name) || in_progress.contains(name) {
                    continue;
                }
                in_progress.insert(name);
                stack.push((node, Phase::Exit));
                if name == source {
                    continue; // The boundary: do not expand its inputs.
                }
                for target in node.data_inputs() {
                    if graph.is_duplicate(target) {
                        return Err(bind_err(format!("node name '{target}' collides")));
                    }
                    let child = graph.node(target).ok_or_else(|| {
                        bind_err(format!(
                            "'{}' references '{target}', which is not in the graph",
                            node.name,
                        ))
                    })?;
                    if visited.contains(target) {
                        continue;
                    }
                    if in_progress.contains(target) {
                        return Err(bind_err(format!(
                            "cycle detected through '{target}'",
                        )));
                    }
                    stack.push((child, Phase::Enter));
                }
            }
            Phase::Exit => {
                in_progress.remove(node.name.as_str());
                visited.insert(node.name.as_str());
                order.push(node);
            }
        }
    }
    Ok(order)
}

fn const_payload(graph: &GraphModel, node: &Node) -> Result<ConstTensor, ConvertError> {
    match node.attr("value") {
        Some(AttrValue::Tensor(t)) => Ok(t.clone()),
        Some(AttrValue::TensorRef(key)) => graph.weight(key).cloned().ok_or_else(|| {
            bind_err(format!(
                "constant '{}' references missing weight tensor '{key}'",
                node.name,
            ))
        }),
        _ => Err(bind_err(format!(
            "constant '{}' carries no payload",
            node.name,
        ))),
    }
}

fn require_const(
    consts: &HashMap<String, ConstTensor>,
    node: &Node,
    key: &str,
) -> Result<(), ConvertError> {
    if consts.contains_key(key) {
        Ok(())
    } else {
        Err(bind_err(format!(
            "'{}' expects constant weights, but '{key}' is not a constant",
            node.name,
        )))
    }
}

fn single_input(node: &Node) -> Result<String, ConvertError> {
    let mut data = node.data_inputs();
    match (data.next(), data.next()) {
        (Some(x), None) => Ok(x.to_string()),
        _ => Err(bind_err(format!(
            "'{}' ({}) expects exactly one data input",
            node.name, node.op,
        ))),
    }
}

fn binary_inputs(node: &Node) -> Result<(String, String), ConvertError> {
    let mut data = node.data_inputs();
    match (data.next(), data.next(), data.next()) {
        (Some(a), Some(b), None) => Ok((a.to_string(), b.to_string())),
        _ => Err(bind_err(format!(
            "'{}' ({}) expects exactly two data inputs",
            node.name, node.op,
        ))),
    }
}

/// `strides` attribute `[1, s, s, 1]`; absent means 1.
fn stride_attr(node: &Node) -> Result<u64, ConvertError> {
    match node.attr("strides") {
        None => Ok(1),
        Some(AttrValue::Ints(v)) if v.len() == 4 && v[1] == v[2] && v[1] > 0 => Ok(v[1] as u64),
        Some(other) => Err(bind_err(format!(
            "'{}' has unusable strides attribute {other:?}",
            node.name,
        ))),
    }
}

/// `ksize` attribute `[1, k, k, 1]`; absent means 2.
fn ksize_attr(node: &Node) -> Result<u64, ConvertError> {
    match node.attr("ksize") {
        None => Ok(2),
        Some(AttrValue::Ints(v)) if v.len() == 4 && v[1] == v[2] && v[1] > 0 => Ok(v[1] as u64),
        Some(other) => Err(bind_err(format!(
            "'{}' has unusable ksize attribute {other:?}",
            node.name,
        ))),
    }
}

fn padding_attr(node: &Node) -> Padding {
    match node.attr("padding") {
        Some(AttrValue::Str(s)) if s.eq_ignore_ascii_case("valid") => Padding::Valid,
        _ => Padding::Same,
    }
}
