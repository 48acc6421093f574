use std::error::Error;
use std::fmt;
use std::fs;

use serde::{Deserialize, Serialize};

use crate::lib::aoi::AoiTable;
use crate::lib::emitter::Role;
use crate::lib::geometry::Rect;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AppSettings {
    pub equipment_info: EquipmentInfo,
    pub stream: StreamSettings,
    pub aoi: AoiSettings,
    pub aggregator: AggregatorSettings,
    pub rest_api: RestAPISettings,
    pub debug: Option<DebugSettings>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EquipmentInfo {
    pub id: String,
}

/// Named-pipe intake (§6, §10.1).
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StreamSettings {
    pub fifo_path: String,
    pub reconnect_backoff_millis: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AoiRectSettings {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl From<&AoiRectSettings> for Rect {
    fn from(r: &AoiRectSettings) -> Self {
        Rect::new(r.x, r.y, r.w, r.h)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AoiSettings {
    pub left: AoiRectSettings,
    pub middle: AoiRectSettings,
    pub right: AoiRectSettings,
}

impl AoiSettings {
    pub fn as_table(&self) -> AoiTable {
        AoiTable {
            left: (&self.left).into(),
            middle: (&self.middle).into(),
            right: (&self.right).into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AggregatorSettings {
    pub endpoint: String,
    pub role: String,
}

impl AggregatorSettings {
    pub fn get_role(&self) -> Result<Role, Box<dyn Error>> {
        match self.role.to_lowercase().as_str() {
            "entry" => Ok(Role::Entry),
            "exit" => Ok(Role::Exit),
            other => Err(format!("unhandled aggregator role: {}", other).into()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RestAPISettings {
    pub enable: bool,
    pub host: String,
    pub back_end_port: i32,
    pub api_scope: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DebugSettings {
    pub enable: bool,
}

impl AppSettings {
    pub fn new(filename: &str) -> Self {
        let toml_contents = fs::read_to_string(filename).expect("Something went wrong reading the file");
        let mut app_settings = match toml::from_str::<AppSettings>(&toml_contents) {
            Ok(result) => result,
            Err(err) => {
                panic!("Can't parse TOML configuration file due the error: {:?}", err);
            }
        };
        if app_settings.debug.is_none() {
            app_settings.debug = Some(DebugSettings { enable: false });
        }
        app_settings
    }
}

impl fmt::Display for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Equipment ID: {}\n\tFIFO: {}\n\tAggregator: {} (role: {})\n\tBack-end host: {}\n\tBack-end port: {}",
            self.equipment_info.id,
            self.stream.fifo_path,
            self.aggregator.endpoint,
            self.aggregator.role,
            self.rest_api.host,
            self.rest_api.back_end_port,
        )
    }
}
