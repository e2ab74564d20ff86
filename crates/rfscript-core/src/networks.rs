//! Networks - the ordered collection the scripting surface manipulates
//!
//! Every operation broadcasts over the members independently. A member the
//! operation does not apply to (wrong port count, empty crop window, ...) is
//! omitted from the result; this is deliberate scripting ergonomics, not
//! error swallowing. Each omission is recorded as a `DroppedMember` on the
//! result and reported through `log::debug!` so the policy stays auditable.

use log::debug;
use thiserror::Error;

use crate::bodefano::BodeFano;
use crate::error::ExprError;
use crate::network::{Lumped, Network, Topology};
use crate::plot::PlotRequest;
use crate::sparams::{SParam, SParams};
use crate::stability::StabilityCircle;

/// Why a member was omitted from an operation's result
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    #[error("operation needs a {want}-port, member has {have} ports")]
    WrongPortCount { have: usize, want: &'static str },

    #[error("port {port} does not exist on a {nports}-port network")]
    MissingPort { port: usize, nports: usize },

    #[error("network is not symmetric")]
    NotSymmetric,

    #[error("network is not reciprocal")]
    NotReciprocal,

    #[error("no frequency samples left in the requested range")]
    EmptyFrequencyRange,

    #[error("frequency axes of the operands differ")]
    FrequencyMismatch,

    #[error("singular matrix encountered")]
    Singular,
}

/// A member omitted from a result, with the reason
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedMember {
    pub name: String,
    pub reason: DropReason,
}

/// Ordered collection of zero or more networks
#[derive(Debug, Clone, Default)]
pub struct Networks {
    members: Vec<Network>,
    dropped: Vec<DroppedMember>,
}

impl Networks {
    pub fn from_members(members: Vec<Network>) -> Self {
        Self {
            members,
            dropped: Vec::new(),
        }
    }

    #[inline]
    pub fn members(&self) -> &[Network] {
        &self.members
    }

    /// Members omitted by the operation that produced this collection
    #[inline]
    pub fn dropped(&self) -> &[DroppedMember] {
        &self.dropped
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Apply a per-member transform, recording inapplicable members
    fn broadcast(
        &self,
        op: &str,
        f: impl Fn(&Network) -> Result<Network, DropReason>,
    ) -> Networks {
        let mut members = Vec::with_capacity(self.members.len());
        let mut dropped = Vec::new();
        for nw in &self.members {
            match f(nw) {
                Ok(out) => members.push(out),
                Err(reason) => {
                    debug!("{}: dropping \"{}\": {}", op, nw.name, reason);
                    dropped.push(DroppedMember {
                        name: nw.name.clone(),
                        reason,
                    });
                }
            }
        }
        Networks { members, dropped }
    }

    /// Apply a per-member trace extraction, recording inapplicable members
    fn broadcast_traces(
        &self,
        op: &str,
        f: impl Fn(&Network) -> Result<SParam, DropReason>,
    ) -> SParams {
        let mut traces = Vec::with_capacity(self.members.len());
        let mut dropped = Vec::new();
        for nw in &self.members {
            match f(nw) {
                Ok(trace) => traces.push(trace),
                Err(reason) => {
                    debug!("{}: dropping \"{}\": {}", op, nw.name, reason);
                    dropped.push(DroppedMember {
                        name: nw.name.clone(),
                        reason,
                    });
                }
            }
        }
        SParams::from_parts(traces, dropped)
    }

    /// Extract one S-parameter per member (1-based ports)
    pub fn s(&self, egress: usize, ingress: usize) -> SParams {
        self.broadcast_traces("s", |nw| {
            if egress == 0 || ingress == 0 {
                return Err(DropReason::MissingPort {
                    port: 0,
                    nports: nw.nports(),
                });
            }
            let values = nw.s_trace(egress - 1, ingress - 1)?;
            Ok(SParam::new(
                format!("S{}{} {}", egress, ingress, nw.name),
                nw.frequency.clone(),
                values,
            ))
        })
    }

    /// Port inversion for de-embedding (2-ports only)
    pub fn invert(&self) -> Networks {
        self.broadcast("invert", Network::invert)
    }

    /// Port-order reversal (2-ports only)
    pub fn flip(&self) -> Networks {
        self.broadcast("flip", Network::flip)
    }

    /// Electrical half of each symmetric reciprocal 2-port
    pub fn half(&self) -> Networks {
        self.broadcast("half", Network::half)
    }

    /// Rollett K stability factor per member
    pub fn k(&self) -> SParams {
        self.broadcast_traces("k", |nw| {
            let k = nw.stability_k()?;
            Ok(SParam::from_real(
                format!("K {}", nw.name),
                nw.frequency.clone(),
                k,
            ))
        })
    }

    /// Edwards-Sinsky µ (order 1) or µ' (order 2) stability factor
    pub fn mu(&self, order: u8) -> Result<SParams, ExprError> {
        if order != 1 && order != 2 {
            return Err(ExprError::Numeric(format!(
                "mu order must be 1 or 2, got {}",
                order
            )));
        }
        Ok(self.broadcast_traces("mu", |nw| {
            let mu = nw.stability_mu(order)?;
            let tick = if order == 1 { "" } else { "'" };
            Ok(SParam::from_real(
                format!("µ{} {}", tick, nw.name),
                nw.frequency.clone(),
                mu,
            ))
        }))
    }

    /// Restrict every member to `[f_start, f_end]`; empty members are dropped
    pub fn crop_f(&self, f_start: f64, f_end: f64) -> Networks {
        self.broadcast("crop_f", |nw| nw.crop_f(f_start, f_end))
    }

    /// Attach a lumped element at the 1-based port (1-ports and 2-ports)
    pub fn add_lumped(
        &self,
        kind: Lumped,
        topology: Topology,
        value: f64,
        port: usize,
    ) -> Networks {
        self.broadcast("add_lumped", |nw| {
            nw.add_lumped(kind, topology, value, port)
        })
    }

    /// Attach a transmission-line stub at the 1-based port
    pub fn add_tl(
        &self,
        degrees: f64,
        frequency_hz: f64,
        z0_line: Option<f64>,
        loss: f64,
        port: usize,
    ) -> Networks {
        self.broadcast("add_tl", |nw| {
            nw.add_tl(degrees, frequency_hz, z0_line, loss, port)
        })
    }

    /// Average return loss (positive dB) over the frequency window
    ///
    /// The result is a constant trace over the in-band samples, so it plots
    /// as a horizontal line across the band.
    pub fn rl_avg(&self, f_start: f64, f_stop: f64) -> SParams {
        self.broadcast_traces("rl_avg", |nw| {
            let gamma = nw.s_trace(0, 0)?;
            let band = nw.crop_f(f_start, f_stop)?;
            let integral =
                BodeFano::integrate_return_loss(&nw.frequency, &gamma, f_start, f_stop)?;
            let avg_db = BodeFano::average_db(integral, &band.frequency)?;
            Ok(SParam::from_real(
                format!("RL avg {}", nw.name),
                band.frequency.clone(),
                vec![avg_db; band.nfreq()],
            ))
        })
    }

    /// Bode-Fano bound: best achievable return loss (positive dB) over the
    /// target band, given the return loss integrated over the integration band
    pub fn rl_opt(
        &self,
        f_integrate_start: f64,
        f_integrate_stop: f64,
        f_target_start: f64,
        f_target_stop: f64,
    ) -> SParams {
        self.broadcast_traces("rl_opt", |nw| {
            let gamma = nw.s_trace(0, 0)?;
            let integral = BodeFano::integrate_return_loss(
                &nw.frequency,
                &gamma,
                f_integrate_start,
                f_integrate_stop,
            )?;
            let target = nw.crop_f(f_target_start, f_target_stop)?;
            let bound_db = BodeFano::bound_db(integral, &target.frequency)?;
            Ok(SParam::from_real(
                format!("RL Bode-Fano {}", nw.name),
                target.frequency.clone(),
                vec![bound_db; target.nfreq()],
            ))
        })
    }

    /// Stability circles at one frequency, as plot requests
    ///
    /// `port` 1 selects the input circle, anything else the output circle.
    /// The label gains a " s.i." or " s.o." suffix depending on whether the
    /// stable region lies inside or outside the circle. The second return
    /// value is the collection passed through for chaining, with the members
    /// that produced no circle recorded on its drop ledger.
    pub fn plot_stab(
        &self,
        frequency_hz: f64,
        port: usize,
        n_points: usize,
        label: Option<&str>,
        style: &str,
    ) -> (Vec<PlotRequest>, Networks) {
        let mut requests = Vec::new();
        let mut dropped = Vec::new();
        for nw in &self.members {
            match StabilityCircle::compute(nw, frequency_hz, port) {
                Ok(circle) => {
                    let (x, y) = circle.points(n_points);
                    let base = label.unwrap_or(&nw.name);
                    let suffix = if circle.stable_inside { "s.i." } else { "s.o." };
                    requests.push(PlotRequest {
                        x,
                        y,
                        label: format!("{} {}", base, suffix),
                        style: style.to_string(),
                    });
                }
                Err(reason) => {
                    debug!("plot_stab: dropping \"{}\": {}", nw.name, reason);
                    dropped.push(DroppedMember {
                        name: nw.name.clone(),
                        reason,
                    });
                }
            }
        }
        let passthrough = Networks {
            members: self.members.clone(),
            dropped,
        };
        (requests, passthrough)
    }

    /// Cascade two collections member-by-member (the `**` operator)
    ///
    /// The collections are treated as parallel sequences: member i of self is
    /// cascaded with member i of other; incompatible pairs are dropped.
    pub fn cascade(&self, other: &Networks) -> Networks {
        let mut members = Vec::new();
        let mut dropped = Vec::new();
        for (a, b) in self.members.iter().zip(other.members.iter()) {
            match a.cascade(b) {
                Ok(out) => members.push(out),
                Err(reason) => {
                    debug!("cascade: dropping \"{}\" ** \"{}\": {}", a.name, b.name, reason);
                    dropped.push(DroppedMember {
                        name: format!("{}**{}", a.name, b.name),
                        reason,
                    });
                }
            }
        }
        Networks { members, dropped }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::Frequency;
    use ndarray::{Array1, Array3};
    use num_complex::Complex64;

    fn one_port(name: &str) -> Network {
        let freq = Frequency::linear(1e9, 2e9, 2);
        let mut s = Array3::<Complex64>::zeros((2, 1, 1));
        s[[0, 0, 0]] = Complex64::new(0.5, 0.0);
        s[[1, 0, 0]] = Complex64::new(0.5, 0.0);
        Network::new(
            name,
            freq,
            s,
            Array1::from_elem(1, Complex64::new(50.0, 0.0)),
        )
    }

    fn two_port(name: &str) -> Network {
        let freq = Frequency::linear(1e9, 2e9, 2);
        let mut s = Array3::<Complex64>::zeros((2, 2, 2));
        for f in 0..2 {
            s[[f, 0, 0]] = Complex64::new(0.1, 0.0);
            s[[f, 1, 1]] = Complex64::new(0.1, 0.0);
            s[[f, 0, 1]] = Complex64::new(0.8, 0.1);
            s[[f, 1, 0]] = Complex64::new(0.8, 0.1);
        }
        Network::new(
            name,
            freq,
            s,
            Array1::from_elem(2, Complex64::new(50.0, 0.0)),
        )
    }

    #[test]
    fn test_silent_drop_records_reason() {
        let nws = Networks::from_members(vec![one_port("load.s1p"), two_port("thru.s2p")]);
        let inverted = nws.invert();

        assert_eq!(inverted.len(), 1);
        assert_eq!(inverted.dropped().len(), 1);
        assert_eq!(inverted.dropped()[0].name, "load.s1p");
        assert!(matches!(
            inverted.dropped()[0].reason,
            DropReason::WrongPortCount { have: 1, .. }
        ));
    }

    #[test]
    fn test_empty_collection_is_total() {
        let empty = Networks::default();
        assert!(empty.invert().is_empty());
        assert!(empty.crop_f(0.0, 1e9).is_empty());
        assert!(empty.s(1, 1).traces().is_empty());
        assert!(empty.cascade(&empty).is_empty());
    }

    #[test]
    fn test_mu_order_validation() {
        let nws = Networks::from_members(vec![two_port("amp.s2p")]);
        assert!(nws.mu(1).is_ok());
        assert!(nws.mu(2).is_ok());
        assert!(matches!(nws.mu(3), Err(ExprError::Numeric(_))));
    }

    #[test]
    fn test_cascade_pairs_positionally() {
        let a = Networks::from_members(vec![two_port("a1"), two_port("a2")]);
        let b = Networks::from_members(vec![two_port("b1")]);
        // only the first pair aligns
        assert_eq!(a.cascade(&b).len(), 1);
    }

    #[test]
    fn test_trace_drops_are_recorded() {
        let nws = Networks::from_members(vec![one_port("load.s1p"), two_port("thru.s2p")]);

        let k = nws.k();
        assert_eq!(k.traces().len(), 1);
        assert_eq!(k.dropped().len(), 1);
        assert_eq!(k.dropped()[0].name, "load.s1p");

        let (requests, out) = nws.plot_stab(1e9, 2, 11, None, "-");
        assert_eq!(requests.len(), 1);
        assert_eq!(out.len(), 2);
        assert_eq!(out.dropped().len(), 1);
        assert!(matches!(
            out.dropped()[0].reason,
            DropReason::WrongPortCount { have: 1, .. }
        ));
    }

    #[test]
    fn test_s_drops_missing_port() {
        let nws = Networks::from_members(vec![one_port("load.s1p"), two_port("thru.s2p")]);
        let traces = nws.s(2, 1);
        assert_eq!(traces.traces().len(), 1);
        assert_eq!(traces.traces()[0].label, "S21 thru.s2p");
    }
}
