//! Gated recurrent unit layer.

use crate::activation::Activation;
use crate::errors::{ConfigurationResult, EvaluationResult};
use crate::model_config::{Component, LayerConfig};
use crate::recurrent::lstm_layer::Gate;
use crate::recurrent::{RecurrentLayer, ScanContext};
use ndarray::{Array1, Array2, ArrayView1, Axis};

/// Standard Keras-convention GRU.
///
/// The update (`z`) and reset (`r`) gates use `inner_activation`; the hidden
/// candidate uses `activation`. Masking carries the previous hidden state
/// forward exactly as the LSTM does: a masked timestep copies h, and a
/// masked first timestep keeps the zero column.
pub struct GruLayer {
    activation: Activation,
    inner_activation: Activation,
    update_gate: Gate,
    reset_gate: Gate,
    hidden_gate: Gate,
    n_outputs: usize,
    return_sequences: bool,
}

impl GruLayer {
    pub fn new(config: &LayerConfig, n_inputs: usize) -> ConfigurationResult<Self> {
        let n_outputs = Gate::declared_outputs(config, Component::Z, n_inputs)?;
        Ok(Self {
            activation: config.activation,
            inner_activation: config.inner_activation,
            update_gate: Gate::from_components(config, Component::Z, n_inputs, n_outputs)?,
            reset_gate: Gate::from_components(config, Component::R, n_inputs, n_outputs)?,
            hidden_gate: Gate::from_components(config, Component::H, n_inputs, n_outputs)?,
            n_outputs,
            return_sequences: config.return_sequences,
        })
    }

    /// Advances the recurrence by one timestep, writing column `time` of the
    /// hidden buffer.
    fn step(&self, time: usize, x_t: &ArrayView1<f64>, masked: bool, hidden: &mut Array2<f64>) {
        if masked {
            if time > 0 {
                let hidden_prev = hidden.column(time - 1).to_owned();
                hidden.column_mut(time).assign(&hidden_prev);
            }
            return;
        }

        let zero = Array1::zeros(self.n_outputs);
        let hidden_prev = if time == 0 {
            zero.view()
        } else {
            hidden.column(time - 1)
        };

        let z = self
            .inner_activation
            .apply(&self.update_gate.preact(x_t, &hidden_prev));
        let r = self
            .inner_activation
            .apply(&self.reset_gate.preact(x_t, &hidden_prev));
        let gated_prev = &r * &hidden_prev;
        let candidate = self
            .activation
            .apply(&self.hidden_gate.preact(x_t, &gated_prev.view()));

        let one_minus_z = z.mapv(|v| 1.0 - v);
        let h_t = &z * &hidden_prev + &one_minus_z * &candidate;
        hidden.column_mut(time).assign(&h_t);
    }
}

impl RecurrentLayer for GruLayer {
    fn scan(
        &self,
        input: &Array2<f64>,
        context: &mut ScanContext,
    ) -> EvaluationResult<Array2<f64>> {
        let timesteps = input.ncols();
        let mask = context.mask_for(timesteps)?.map(<[bool]>::to_vec);
        let mut hidden = Array2::zeros((self.n_outputs, timesteps));

        for (time, x_t) in input.axis_iter(Axis(1)).enumerate() {
            let masked = mask.as_ref().is_some_and(|m| m[time]);
            self.step(time, &x_t, masked, &mut hidden);
        }

        if self.return_sequences {
            Ok(hidden)
        } else if timesteps == 0 {
            Err(crate::errors::EvaluationError::EmptySequence)
        } else {
            Ok(hidden.column(timesteps - 1).to_owned().insert_axis(Axis(1)))
        }
    }

    fn n_outputs(&self) -> usize {
        self.n_outputs
    }
}
