//! Process-wide configuration, set before topology construction (`spec.md` §6).
use crate::error::DbaError;
use crate::types::TcontType;
use crate::units::BaseGrant;

/// The two PHY alternatives this engine can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PonMode {
    /// XG-PON: 4-byte base grant unit, 2.48832 Gbit/s upstream.
    XgPon,
    /// XG(S)-PON: 16-byte base grant unit, 9.95328 Gbit/s upstream.
    XgsPon,
}

impl PonMode {
    /// The base grant unit fixed by this PON generation.
    pub const fn base_grant(self) -> BaseGrant {
        match self {
            PonMode::XgPon => BaseGrant::XGPON,
            PonMode::XgsPon => BaseGrant::XGSPON,
        }
    }
}

/// Selects the OLT-side DBA grant-size policy (`spec.md` §4.2, §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OltDbaEngineType {
    /// The reference policy: visit every T-CONT in round-robin order.
    RoundRobin,
    /// QoS-aware, prioritizing assured bandwidth ahead of non-assured/best-effort.
    Giant,
    /// QoS-aware, prioritizing assured bandwidth ahead of everything else.
    Ebu,
    /// QoS-aware, strict type-1 > 2 > 3 > 4 priority.
    Xgiant,
    /// `Xgiant` with deficit-counter carry-over across cycles for types 3/4.
    XgiantDeficit,
    /// `Xgiant` with the deficit quantum weighted by configured bandwidth share.
    XgiantProp,
}

/// Selects the ONU-side per-T-CONT connection scheduler (`spec.md` §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UsSchedulerType {
    /// Round-robin across the connections under one T-CONT, draining each FIFO.
    #[default]
    RoundRobin,
}

/// Selects the per-connection SDU queue discipline (`spec.md` §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueueType {
    /// Plain FIFO, the only discipline this engine implements.
    #[default]
    Fifo,
}

/// Process-wide configuration (`spec.md` §6, "Configuration").
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub pon_mode: PonMode,
    pub olt_dba_engine_type: OltDbaEngineType,
    pub us_scheduler_type: UsSchedulerType,
    pub queue_type: QueueType,
    pub profile_preamble_len: u16,
    pub profile_delimiter_len: u16,
    pub profile_fec: bool,
    pub olt_netmask_len: u8,
    pub onu_netmask_len: u8,
    pub ip_first_byte_xgpon: u8,
    pub ip_first_byte_onus: u8,
    pub allocate_ids_for_speed: bool,
    /// Number of upstream frame slots (125 us each) per DBA cycle. Default 4.
    pub frames_per_dba_cycle: u8,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            pon_mode: PonMode::XgsPon,
            olt_dba_engine_type: OltDbaEngineType::RoundRobin,
            us_scheduler_type: UsSchedulerType::RoundRobin,
            queue_type: QueueType::Fifo,
            profile_preamble_len: 160,
            profile_delimiter_len: 4,
            profile_fec: true,
            olt_netmask_len: 16,
            onu_netmask_len: 24,
            ip_first_byte_xgpon: 10,
            ip_first_byte_onus: 172,
            allocate_ids_for_speed: false,
            frames_per_dba_cycle: 4,
        }
    }
}

/// Construct-then-validate builder, in the style of `node/mn/config.rs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        ConfigBuilder { config: Config::default() }
    }

    pub fn pon_mode(mut self, mode: PonMode) -> Self {
        self.config.pon_mode = mode;
        self
    }

    pub fn olt_dba_engine_type(mut self, engine: OltDbaEngineType) -> Self {
        self.config.olt_dba_engine_type = engine;
        self
    }

    pub fn frames_per_dba_cycle(mut self, frames: u8) -> Self {
        self.config.frames_per_dba_cycle = frames;
        self
    }

    pub fn build(self) -> Result<Config, DbaError> {
        if self.config.frames_per_dba_cycle == 0 {
            return Err(DbaError::InvalidQosBundle("frames_per_dba_cycle must be >= 1"));
        }
        Ok(self.config)
    }
}

/// Per-T-CONT QoS configuration, set before topology install (`spec.md` §3, §6).
#[derive(Debug, Clone, Copy)]
pub struct QosConfig {
    pub tcont_type: TcontType,
    /// Bits/second.
    pub fixed_bw: u64,
    /// Bits/second.
    pub assured_bw: u64,
    /// Bits/second.
    pub non_assured_bw: u64,
    /// Bits/second.
    pub best_effort_bw: u64,
    /// Frame-slot units (125 us each).
    pub max_service_interval: u16,
    /// Frame-slot units (125 us each).
    pub min_service_interval: u16,
}

impl QosConfig {
    /// Builds a type-1 (fixed) bundle sized for `bits_per_sec`.
    pub fn fixed(bits_per_sec: u64, max_si: u16) -> Self {
        QosConfig {
            tcont_type: TcontType::Fixed,
            fixed_bw: bits_per_sec,
            assured_bw: 0,
            non_assured_bw: 0,
            best_effort_bw: 0,
            max_service_interval: max_si,
            min_service_interval: max_si.saturating_mul(2),
        }
    }

    /// Builds a type-2 (assured) bundle sized for `bits_per_sec`.
    pub fn assured(bits_per_sec: u64, max_si: u16) -> Self {
        QosConfig {
            tcont_type: TcontType::Assured,
            fixed_bw: 0,
            assured_bw: bits_per_sec,
            non_assured_bw: 0,
            best_effort_bw: 0,
            max_service_interval: max_si,
            min_service_interval: max_si.saturating_mul(2),
        }
    }

    /// Builds a type-4 (best-effort) bundle with no guaranteed rate.
    pub fn best_effort(max_si: u16) -> Self {
        QosConfig {
            tcont_type: TcontType::BestEffort,
            fixed_bw: 0,
            assured_bw: 0,
            non_assured_bw: 0,
            best_effort_bw: 1,
            max_service_interval: max_si,
            min_service_interval: max_si.saturating_mul(2),
        }
    }

    /// Validates the invariants stated in `spec.md` §3.
    pub fn validate(&self) -> Result<(), DbaError> {
        if self.max_service_interval == 0 {
            return Err(DbaError::InvalidQosBundle("MaxSI must be >= 1"));
        }
        match self.tcont_type {
            TcontType::Assured => {
                if self.fixed_bw != 0 || self.assured_bw == 0 {
                    return Err(DbaError::InvalidQosBundle(
                        "type-2 requires fixed=0 and assured>0",
                    ));
                }
            }
            TcontType::BestEffort => {
                if self.fixed_bw != 0 || self.assured_bw != 0 || self.non_assured_bw != 0 {
                    return Err(DbaError::InvalidQosBundle("type-4 requires only best-effort>0"));
                }
            }
            _ => {}
        }
        Ok(())
    }
}
