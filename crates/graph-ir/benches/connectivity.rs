// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for connectivity-index construction.
//!
//! The analyzer must handle graphs with thousands of nodes without
//! quadratic blowup; this bench tracks the single-pass build on a long
//! convolution chain with realistic fan-in.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use graph_ir::{ConnectivityIndex, GraphModel, Node};

fn chain_graph(n: usize) -> GraphModel {
    let mut nodes = Vec::with_capacity(2 * n + 1);
    nodes.push(Node::new("input", "Placeholder", vec![]));
    let mut prev = "input".to_string();
    for i in 0..n {
        let w = format!("w{i}");
        let conv = format!("conv{i}");
        nodes.push(Node::new(w.clone(), "Const", vec![]));
        nodes.push(Node::new(
            conv.clone(),
            "Conv2D",
            vec![format!("{prev}:0"), w],
        ));
        prev = conv;
    }
    GraphModel::new("bench", nodes)
}

fn bench_build(c: &mut Criterion) {
    let graph = chain_graph(2000);
    c.bench_function("connectivity_build_4k_nodes", |b| {
        b.iter(|| ConnectivityIndex::build(black_box(&graph)))
    });
}

criterion_group!(benches, bench_build);
criterion_main!(benches);
