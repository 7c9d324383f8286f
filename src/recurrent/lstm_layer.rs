//! Long short-term memory layer.

use crate::activation::Activation;
use crate::errors::{ConfigurationError, ConfigurationResult, EvaluationResult};
use crate::model_config::{Component, LayerConfig};
use crate::recurrent::{RecurrentLayer, ScanContext};
use crate::utils::matrix::{build_matrix, build_vector};
use ndarray::{Array1, Array2, ArrayView1, Axis};

/// One gate's parameters: input weights, recurrent weights, bias.
pub(crate) struct Gate {
    pub(crate) w: Array2<f64>,
    pub(crate) u: Array2<f64>,
    pub(crate) b: Array1<f64>,
}

impl Gate {
    /// Builds one gate from the component map, checking that its shapes
    /// agree with the running input width and the layer output width.
    pub(crate) fn from_components(
        config: &LayerConfig,
        component: Component,
        n_inputs: usize,
        n_outputs: usize,
    ) -> ConfigurationResult<Self> {
        let gate = config.components.get(&component).ok_or_else(|| {
            ConfigurationError::MissingComponent {
                architecture: config.architecture.as_str().to_string(),
                component: component.as_str().to_string(),
            }
        })?;

        let w = build_matrix(&gate.weights, n_inputs)?;
        if w.nrows() != n_outputs {
            return Err(ConfigurationError::ComponentSizeMismatch {
                component: component.as_str().to_string(),
                expected: n_outputs,
                actual: w.nrows(),
            });
        }
        if gate.recurrent_weights.len() != n_outputs * n_outputs {
            return Err(ConfigurationError::RecurrentWeightsNotSquare {
                component: component.as_str().to_string(),
                width: n_outputs,
                n_weights: gate.recurrent_weights.len(),
            });
        }
        let u = build_matrix(&gate.recurrent_weights, n_outputs)?;
        let b = build_vector(&gate.bias, n_outputs)?;
        Ok(Self { w, u, b })
    }

    /// Pre-activation gate value: `W x + b + U h`.
    pub(crate) fn preact(&self, x: &ArrayView1<f64>, h: &ArrayView1<f64>) -> Array1<f64> {
        self.w.dot(x) + &self.b + self.u.dot(h)
    }

    /// Output width declared by the component map for this gate set, derived
    /// from the row count of the given component's weight matrix.
    pub(crate) fn declared_outputs(
        config: &LayerConfig,
        component: Component,
        n_inputs: usize,
    ) -> ConfigurationResult<usize> {
        let gate = config.components.get(&component).ok_or_else(|| {
            ConfigurationError::MissingComponent {
                architecture: config.architecture.as_str().to_string(),
                component: component.as_str().to_string(),
            }
        })?;
        Ok(build_matrix(&gate.weights, n_inputs)?.nrows())
    }
}

/// Per-call scratch state of one LSTM scan: cell and hidden sequences with a
/// column per timestep. Allocated fresh at the start of every scan and
/// discarded afterwards; it is never part of the layer itself.
struct LstmState {
    cell: Array2<f64>,
    hidden: Array2<f64>,
}

impl LstmState {
    fn zeros(n_outputs: usize, timesteps: usize) -> Self {
        Self {
            cell: Array2::zeros((n_outputs, timesteps)),
            hidden: Array2::zeros((n_outputs, timesteps)),
        }
    }
}

/// Standard Keras-convention LSTM.
///
/// Gates use `inner_activation`, state transforms use `activation`. Masked
/// timesteps copy the previous cell and hidden state forward unchanged; a
/// masked first timestep keeps the zero-initialized state column.
pub struct LstmLayer {
    activation: Activation,
    inner_activation: Activation,
    input_gate: Gate,
    forget_gate: Gate,
    output_gate: Gate,
    cell_gate: Gate,
    n_outputs: usize,
    return_sequences: bool,
}

impl LstmLayer {
    pub fn new(config: &LayerConfig, n_inputs: usize) -> ConfigurationResult<Self> {
        let n_outputs = Gate::declared_outputs(config, Component::O, n_inputs)?;
        Ok(Self {
            activation: config.activation,
            inner_activation: config.inner_activation,
            input_gate: Gate::from_components(config, Component::I, n_inputs, n_outputs)?,
            forget_gate: Gate::from_components(config, Component::F, n_inputs, n_outputs)?,
            output_gate: Gate::from_components(config, Component::O, n_inputs, n_outputs)?,
            cell_gate: Gate::from_components(config, Component::C, n_inputs, n_outputs)?,
            n_outputs,
            return_sequences: config.return_sequences,
        })
    }

    /// Advances the recurrence by one timestep, writing column `time` of the
    /// state buffers.
    fn step(&self, time: usize, x_t: &ArrayView1<f64>, masked: bool, state: &mut LstmState) {
        if masked {
            if time > 0 {
                let cell_prev = state.cell.column(time - 1).to_owned();
                let hidden_prev = state.hidden.column(time - 1).to_owned();
                state.cell.column_mut(time).assign(&cell_prev);
                state.hidden.column_mut(time).assign(&hidden_prev);
            }
            // time == 0: the zero-initialized column already is the state.
            return;
        }

        let zero = Array1::zeros(self.n_outputs);
        let (hidden_prev, cell_prev) = if time == 0 {
            (zero.view(), zero.view())
        } else {
            (state.hidden.column(time - 1), state.cell.column(time - 1))
        };

        let i = self
            .inner_activation
            .apply(&self.input_gate.preact(x_t, &hidden_prev));
        let f = self
            .inner_activation
            .apply(&self.forget_gate.preact(x_t, &hidden_prev));
        let o = self
            .inner_activation
            .apply(&self.output_gate.preact(x_t, &hidden_prev));
        let candidate = self
            .activation
            .apply(&self.cell_gate.preact(x_t, &hidden_prev));

        let cell = &f * &cell_prev + &i * &candidate;
        let hidden = &o * &self.activation.apply(&cell);
        state.cell.column_mut(time).assign(&cell);
        state.hidden.column_mut(time).assign(&hidden);
    }
}

impl RecurrentLayer for LstmLayer {
    fn scan(
        &self,
        input: &Array2<f64>,
        context: &mut ScanContext,
    ) -> EvaluationResult<Array2<f64>> {
        let timesteps = input.ncols();
        let mask = context.mask_for(timesteps)?.map(<[bool]>::to_vec);
        let mut state = LstmState::zeros(self.n_outputs, timesteps);

        for (time, x_t) in input.axis_iter(Axis(1)).enumerate() {
            let masked = mask.as_ref().is_some_and(|m| m[time]);
            self.step(time, &x_t, masked, &mut state);
        }

        if self.return_sequences {
            Ok(state.hidden)
        } else if timesteps == 0 {
            Err(crate::errors::EvaluationError::EmptySequence)
        } else {
            Ok(state
                .hidden
                .column(timesteps - 1)
                .to_owned()
                .insert_axis(Axis(1)))
        }
    }

    fn n_outputs(&self) -> usize {
        self.n_outputs
    }
}
