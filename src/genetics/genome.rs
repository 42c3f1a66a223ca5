//! Flat genome encoding of a network's parameters.
//!
//! Layout: every layer's weights (row-major), in layer order, followed by
//! every layer's biases in layer order.

use crate::error::{Error, Result};
use crate::neural::{Layer, Network, Topology};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Parameter vector plus the fitness the caller assigned to it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    pub genotype: Vec<f32>,
    /// `None` until evaluated
    pub fitness: Option<f32>,
}

impl Genome {
    pub fn new(genotype: Vec<f32>) -> Self {
        Self {
            genotype,
            fitness: None,
        }
    }

    pub fn from_network(network: &Network) -> Self {
        Self::new(encode(network))
    }

    pub fn to_network(&self, topology: &Topology) -> Result<Network> {
        decode(&self.genotype, topology)
    }

    pub fn len(&self) -> usize {
        self.genotype.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genotype.is_empty()
    }

    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    pub fn set_fitness(&mut self, fitness: f32) {
        self.fitness = Some(fitness);
    }
}

/// Flatten weights then biases into one vector
pub fn encode(network: &Network) -> Vec<f32> {
    let layers = network.layers();
    let mut genotype = Vec::with_capacity(network.parameter_count());
    for layer in layers {
        genotype.extend(layer.weights().iter().copied());
    }
    for layer in layers {
        genotype.extend(layer.bias().iter().copied());
    }
    genotype
}

/// Rebuild a network of `topology` from a genotype produced by [`encode`]
pub fn decode(genotype: &[f32], topology: &Topology) -> Result<Network> {
    topology.validate()?;
    let expected = topology.parameter_count();
    if genotype.len() != expected {
        return Err(Error::len("genome length", expected, genotype.len()));
    }

    let (weights, biases) = genotype.split_at(topology.weight_count());
    let mut w_offset = 0;
    let mut b_offset = 0;
    let mut network = Network::new(topology.inputs);

    for (shape, (outputs, inputs)) in topology.layers.iter().zip(topology.layer_dims()) {
        let w_len = outputs * inputs;
        let w = Array2::from_shape_vec(
            (outputs, inputs),
            weights[w_offset..w_offset + w_len].to_vec(),
        )
        .map_err(|e| Error::InvalidParameter(e.to_string()))?;
        let b = Array2::from_shape_vec((outputs, 1), biases[b_offset..b_offset + outputs].to_vec())
            .map_err(|e| Error::InvalidParameter(e.to_string()))?;
        w_offset += w_len;
        b_offset += outputs;

        network.add_layer(Layer::from_parts(w, b, shape.activation)?)?;
    }

    Ok(network)
}
