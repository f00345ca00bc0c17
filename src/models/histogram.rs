use serde::{Deserialize, Serialize};

/// Joint counts of wind direction at two hours of the same day.
///
/// `counts[a][b]` holds the number of days whose direction at `hour_a` fell in bin `a`
/// and whose direction at `hour_b` fell in bin `b`. Edges are ascending and include 360.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindHistogram {
    pub station_id: u32,
    pub hour_a: u32,
    pub hour_b: u32,
    pub min_wind_speed: f64,
    pub bin_width: f64,
    pub x_edges: Vec<f64>,
    pub y_edges: Vec<f64>,
    pub counts: Vec<Vec<u64>>,
    pub total: u64,
    /// Days fast enough at both hours but missing a direction at one of them.
    pub missing_direction: u64,
}

impl WindHistogram {
    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub fn count(&self, a: usize, b: usize) -> u64 {
        self.counts
            .get(a)
            .and_then(|row| row.get(b))
            .copied()
            .unwrap_or(0)
    }

    pub fn x_centers(&self) -> Vec<f64> {
        centers(&self.x_edges)
    }

    /// Most frequent bin pair as `(a, b, count)`, ties resolved to the lowest indices.
    pub fn peak(&self) -> Option<(usize, usize, u64)> {
        let mut best: Option<(usize, usize, u64)> = None;
        for (a, row) in self.counts.iter().enumerate() {
            for (b, &count) in row.iter().enumerate() {
                if count > 0 && best.map_or(true, |(_, _, c)| count > c) {
                    best = Some((a, b, count));
                }
            }
        }
        best
    }

    pub fn summary(&self) -> String {
        let mut out = format!(
            "Station {}: wind direction at {:02}h vs {:02}h, speed >= {:.1} m/s, {}° bins\n",
            self.station_id, self.hour_a, self.hour_b, self.min_wind_speed, self.bin_width
        );
        out.push_str(&format!("Days counted: {}\n", self.total));
        if self.missing_direction > 0 {
            out.push_str(&format!(
                "Days without direction: {}\n",
                self.missing_direction
            ));
        }

        if let Some((a, b, count)) = self.peak() {
            let centers = self.x_centers();
            out.push_str(&format!(
                "Most frequent: [{:.0}, {:.0}) at {:02}h -> [{:.0}, {:.0}) at {:02}h ({} days, around {:.0}° -> {:.0}°)",
                self.x_edges[a],
                self.x_edges[a + 1],
                self.hour_a,
                self.y_edges[b],
                self.y_edges[b + 1],
                self.hour_b,
                count,
                centers[a],
                centers[b]
            ));
        } else {
            out.push_str("No day passed the wind speed filter");
        }

        out
    }
}

fn centers(edges: &[f64]) -> Vec<f64> {
    edges.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WindHistogram {
        WindHistogram {
            station_id: 7481,
            hour_a: 6,
            hour_b: 15,
            min_wind_speed: 5.0,
            bin_width: 90.0,
            x_edges: vec![0.0, 90.0, 180.0, 270.0, 360.0],
            y_edges: vec![0.0, 90.0, 180.0, 270.0, 360.0],
            counts: vec![
                vec![0, 1, 0, 0],
                vec![0, 0, 0, 0],
                vec![0, 0, 3, 0],
                vec![0, 0, 0, 0],
            ],
            total: 4,
            missing_direction: 2,
        }
    }

    #[test]
    fn test_centers() {
        let histogram = sample();
        assert_eq!(histogram.x_centers(), vec![45.0, 135.0, 225.0, 315.0]);
        assert_eq!(histogram.bins(), 4);
    }

    #[test]
    fn test_peak_and_summary() {
        let histogram = sample();
        assert_eq!(histogram.peak(), Some((2, 2, 3)));
        assert_eq!(histogram.count(0, 1), 1);
        assert_eq!(histogram.count(9, 9), 0);

        let summary = histogram.summary();
        assert!(summary.contains("Days counted: 4"));
        assert!(summary.contains("[180, 270) at 06h"));
        assert!(summary.contains("around 225° -> 225°"));
        assert!(summary.contains("Days without direction: 2"));
    }
}
