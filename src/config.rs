use crate::chart::ColorScale;
use crate::data::Cleaning;
use crate::kmeans::KMeans;
use crate::scatter::ScatterStyle;
use crate::shares::ChoroplethStyle;

#[derive(Debug, Clone)]
pub struct Config {
    /// Empty disables the choropleth view.
    pub complaints_csv: String,
    pub complaints_cleaning: Cleaning,
    /// Empty disables the cluster view.
    pub tumors_csv: String,
    pub host: String,
    pub port: u16,
    pub cluster_count: usize,
    pub cluster_seed: u64,
    pub cluster_n_init: usize,
    pub cluster_max_iter: usize,
    pub color_scale: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            complaints_csv: "data/top_100_companies_complaints.csv".to_string(),
            complaints_cleaning: Cleaning::Strict,
            tumors_csv: "data/data_cancer.csv".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8051,
            cluster_count: 4,
            cluster_seed: 0,
            cluster_n_init: 10,
            cluster_max_iter: 300,
            color_scale: "plasma".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            complaints_csv: std::env::var("COMPLAINTS_CSV").unwrap_or(d.complaints_csv),
            complaints_cleaning: std::env::var("COMPLAINTS_CLEANING").ok().and_then(|v| Cleaning::parse(&v)).unwrap_or(d.complaints_cleaning),
            tumors_csv: std::env::var("TUMORS_CSV").unwrap_or(d.tumors_csv),
            host: std::env::var("HOST").unwrap_or(d.host),
            port: std::env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(d.port),
            cluster_count: std::env::var("CLUSTER_COUNT").ok().and_then(|v| v.parse().ok()).unwrap_or(d.cluster_count),
            cluster_seed: std::env::var("CLUSTER_SEED").ok().and_then(|v| v.parse().ok()).unwrap_or(d.cluster_seed),
            cluster_n_init: std::env::var("CLUSTER_N_INIT").ok().and_then(|v| v.parse().ok()).unwrap_or(d.cluster_n_init),
            cluster_max_iter: std::env::var("CLUSTER_MAX_ITER").ok().and_then(|v| v.parse().ok()).unwrap_or(d.cluster_max_iter),
            color_scale: std::env::var("COLOR_SCALE").unwrap_or(d.color_scale),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn kmeans(&self) -> KMeans {
        KMeans::new(self.cluster_count)
            .with_seed(self.cluster_seed)
            .with_n_init(self.cluster_n_init)
            .with_max_iter(self.cluster_max_iter)
    }

    /// Unknown scale names fall back to plasma.
    pub fn choropleth_style(&self) -> ChoroplethStyle {
        let colorscale = ColorScale::by_name(&self.color_scale).unwrap_or_else(ColorScale::plasma);
        let colorbar_title = if self.color_scale.eq_ignore_ascii_case("reds") {
            "%".to_string()
        } else {
            "Share of Complaints (%)".to_string()
        };
        ChoroplethStyle {
            colorscale,
            colorbar_title,
        }
    }

    pub fn scatter_style(&self) -> ScatterStyle {
        ScatterStyle::default()
    }
}
