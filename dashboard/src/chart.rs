use serde::Serialize;
use serde_json::{json, Value};

use crate::services::chart_service::CandlestickSeries;

/// Column-wise candlestick data, one entry per bar in time order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub x: Vec<String>,
    pub open: Vec<Option<f64>>,
    pub close: Vec<Option<f64>>,
    pub high: Vec<Option<f64>>,
    pub low: Vec<Option<f64>>,
}

impl ChartSeries {
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Plotly figure with a range slider, empty when there are no bars.
    pub fn to_figure(&self) -> Value {
        let data = if self.is_empty() {
            json!([])
        } else {
            json!([{
                "type": "candlestick",
                "x": self.x,
                "open": self.open,
                "close": self.close,
                "high": self.high,
                "low": self.low,
            }])
        };

        json!({
            "data": data,
            "layout": {
                "xaxis": { "rangeslider": { "visible": true } },
                "yaxis": { "title": { "text": "Price" } },
            },
        })
    }
}

impl From<&CandlestickSeries> for ChartSeries {
    fn from(series: &CandlestickSeries) -> Self {
        let mut chart = ChartSeries::default();
        for (datetime, candlestick) in series {
            chart.x.push(datetime.format("%Y-%m-%d %H:%M:%S").to_string());
            chart.open.push(candlestick.open_price);
            chart.close.push(candlestick.close_price);
            chart.high.push(candlestick.high_price);
            chart.low.push(candlestick.low_price);
        }
        chart
    }
}
