use chrono::{DateTime, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// The five numeric fields carried through the pipeline, in reduced column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeatherField {
    WindDir,
    WindSpeed,
    Temperature,
    Humidity,
    GustTen,
}

impl WeatherField {
    pub const ALL: [WeatherField; 5] = [
        WeatherField::WindDir,
        WeatherField::WindSpeed,
        WeatherField::Temperature,
        WeatherField::Humidity,
        WeatherField::GustTen,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            WeatherField::WindDir => "wind_dir",
            WeatherField::WindSpeed => "wind_speed",
            WeatherField::Temperature => "temperature",
            WeatherField::Humidity => "humidity",
            WeatherField::GustTen => "gust_ten",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Column name in the per-day table, e.g. `wind_speed_06`.
    pub fn column_name(&self, hour: u32) -> String {
        format!("{}_{:02}", self.name(), hour)
    }
}

impl std::fmt::Display for WeatherField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A typed row for the target station. `None` stands for a value the station did not measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub wind_dir: Option<f64>,
    pub wind_speed: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub gust_ten: Option<f64>,
}

impl Observation {
    pub fn new(timestamp: DateTime<Utc>, values: [Option<f64>; 5]) -> Self {
        let [wind_dir, wind_speed, temperature, humidity, gust_ten] = values;
        Self {
            timestamp,
            wind_dir,
            wind_speed,
            temperature,
            humidity,
            gust_ten,
        }
    }

    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }

    pub fn value(&self, field: WeatherField) -> Option<f64> {
        match field {
            WeatherField::WindDir => self.wind_dir,
            WeatherField::WindSpeed => self.wind_speed,
            WeatherField::Temperature => self.temperature,
            WeatherField::Humidity => self.humidity,
            WeatherField::GustTen => self.gust_ten,
        }
    }

    pub fn values(&self) -> [Option<f64>; 5] {
        WeatherField::ALL.map(|field| self.value(field))
    }
}
