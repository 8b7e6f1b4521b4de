use evorace_nn::NeuralNetwork;

use crate::CarError;

/// Actuation applied to the motion model for one tick.
///
/// Positive rotation turns left. Only the velocity is bounded by the motion model, so
/// coefficients outside `[-1, 1]` accelerate and turn proportionally faster.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ControlInput {
    engine: f32,
    rotation: f32,
    coast: bool,
}

impl ControlInput {
    /// No keys held: the car coasts toward a stop.
    pub const IDLE: Self = Self {
        engine: 0.0,
        rotation: 0.0,
        coast: true,
    };

    /// Both coefficients are clamped to `[-1, 1]`.
    #[must_use]
    pub fn new(engine: f32, rotation: f32) -> Self {
        Self::raw(engine.clamp(-1.0, 1.0), rotation.clamp(-1.0, 1.0))
    }

    /// Coefficients passed through unchanged, as a network produces them.
    #[must_use]
    pub const fn raw(engine: f32, rotation: f32) -> Self {
        Self {
            engine,
            rotation,
            coast: false,
        }
    }

    #[must_use]
    pub fn engine(&self) -> f32 {
        self.engine
    }

    #[must_use]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Whether the car loses speed on its own this tick instead of following `engine`.
    #[must_use]
    pub fn coasts(&self) -> bool {
        self.coast
    }
}

/// Key state of a human driver.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HumanInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl From<HumanInput> for ControlInput {
    fn from(keys: HumanInput) -> Self {
        let engine = if keys.backward {
            -1.0
        } else if keys.forward {
            1.0
        } else {
            0.0
        };
        let rotation = if keys.right {
            -1.0
        } else if keys.left {
            1.0
        } else {
            0.0
        };
        Self {
            coast: !keys.forward && !keys.backward,
            ..Self::new(engine, rotation)
        }
    }
}

/// Source of a car's actuation.
#[derive(Debug, Clone, PartialEq, derive_more::IsVariant)]
pub enum Controller {
    Human(HumanInput),
    Ai(NeuralNetwork),
}

impl Controller {
    /// Produces this tick's actuation from sensor readings.
    ///
    /// The network's first output steers and its second drives the engine. Human
    /// controllers ignore the sensors.
    pub fn control_input(&self, sensors: &[f32]) -> Result<ControlInput, CarError> {
        match self {
            Self::Human(keys) => Ok((*keys).into()),
            Self::Ai(network) => {
                let output = network.query(sensors)?;
                if output.len() < 2 {
                    return Err(CarError::OutputCount {
                        actual: output.len(),
                    });
                }
                Ok(ControlInput::raw(output[1], output[0]))
            }
        }
    }

    /// The network driving this car, if any.
    #[must_use]
    pub fn network(&self) -> Option<&NeuralNetwork> {
        match self {
            Self::Human(_) => None,
            Self::Ai(network) => Some(network),
        }
    }
}

#[cfg(test)]
mod tests {
    use evorace_nn::{Activation, LayerSpec, NetworkError};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn network(units: &[usize]) -> NeuralNetwork {
        let specs: Vec<_> = units
            .iter()
            .map(|&u| LayerSpec::new(u, Activation::None))
            .collect();
        NeuralNetwork::new(&specs, &mut Pcg32::seed_from_u64(11)).unwrap()
    }

    #[test]
    fn test_human_keys() {
        let up = HumanInput {
            forward: true,
            left: true,
            ..HumanInput::default()
        };
        assert_eq!(ControlInput::from(up), ControlInput::new(1.0, 1.0));
        assert!(!ControlInput::from(up).coasts());

        let all = HumanInput {
            forward: true,
            backward: true,
            left: true,
            right: true,
        };
        assert_eq!(ControlInput::from(all), ControlInput::new(-1.0, -1.0));
        assert_eq!(ControlInput::from(HumanInput::default()), ControlInput::IDLE);
        let steering_only = ControlInput::from(HumanInput {
            left: true,
            ..HumanInput::default()
        });
        assert!(steering_only.coasts());
    }

    #[test]
    fn test_clamped() {
        let input = ControlInput::new(3.0, -7.5);
        assert!((input.engine() - 1.0).abs() < f32::EPSILON);
        assert!((input.rotation() + 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_ai_maps_outputs_positionally() {
        let base = network(&[3, 2]);
        // zero weights leave only the bias: rotation 0.25, engine -0.5
        let layer = base.weighted_layers()[0]
            .with_weights(vec![0.0; 6])
            .and_then(|l| l.with_bias(vec![0.25, -0.5]))
            .unwrap();
        let net = base.with_weighted_layers(vec![layer]).unwrap();
        let input = Controller::Ai(net).control_input(&[0.1, 0.2, 0.3]).unwrap();
        assert_eq!(input, ControlInput::raw(-0.5, 0.25));
        assert!(!input.coasts());
    }

    #[test]
    fn test_ai_outputs_are_not_clamped() {
        let base = network(&[3, 2]);
        let layer = base.weighted_layers()[0]
            .with_weights(vec![0.0; 6])
            .and_then(|l| l.with_bias(vec![3.0, 5.0]))
            .unwrap();
        let net = base.with_weighted_layers(vec![layer]).unwrap();
        let input = Controller::Ai(net).control_input(&[0.0; 3]).unwrap();
        assert!((input.engine() - 5.0).abs() < f32::EPSILON);
        assert!((input.rotation() - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_ai_shape_errors() {
        let ai = Controller::Ai(network(&[3, 2]));
        assert!(matches!(
            ai.control_input(&[1.0]),
            Err(CarError::Network(NetworkError::InputLength { .. }))
        ));

        let single = Controller::Ai(network(&[3, 1]));
        assert!(matches!(
            single.control_input(&[0.0; 3]),
            Err(CarError::OutputCount { actual: 1 })
        ));
    }

    #[test]
    fn test_network_access() {
        assert!(Controller::Human(HumanInput::default()).network().is_none());
        let ai = Controller::Ai(network(&[2, 2]));
        assert!(ai.is_ai());
        assert_eq!(ai.network().unwrap().input_units(), 2);
    }
}
