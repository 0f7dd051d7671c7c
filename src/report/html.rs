use super::pct_of_spot;
use crate::types::{ResultRecord, StrategyConfig, VolRegime};

/// Stylesheet for the standalone report document
const STYLE: &str = r#"
        body {
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            margin: 0;
            padding: 20px;
            background-color: #f5f5f5;
        }
        .container {
            max-width: 1200px;
            margin: 0 auto;
            background-color: white;
            padding: 30px;
            box-shadow: 0 0 10px rgba(0,0,0,0.1);
        }
        h1 {
            color: #2E86AB;
            border-bottom: 3px solid #2E86AB;
            padding-bottom: 10px;
        }
        h2 {
            color: #333;
            background-color: #f0f0f0;
            padding: 10px;
            margin-top: 30px;
        }
        .metric-grid {
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(250px, 1fr));
            gap: 20px;
            margin: 20px 0;
        }
        .metric-card {
            background-color: #f9f9f9;
            border-left: 4px solid #2E86AB;
            padding: 15px;
            border-radius: 4px;
        }
        .metric-label {
            font-weight: bold;
            color: #666;
            font-size: 0.9em;
        }
        .metric-value {
            font-size: 1.3em;
            color: #2E86AB;
            margin-top: 5px;
        }
        .strike-table {
            width: 100%;
            border-collapse: collapse;
            margin: 20px 0;
        }
        .strike-table th, .strike-table td {
            padding: 12px;
            text-align: left;
            border-bottom: 1px solid #ddd;
        }
        .strike-table th {
            background-color: #2E86AB;
            color: white;
        }
        .strike-table tr:hover {
            background-color: #f5f5f5;
        }
        .chart {
            margin: 20px 0;
            text-align: center;
        }
        .chart svg {
            max-width: 100%;
            height: auto;
            border: 1px solid #ddd;
            border-radius: 4px;
        }
        .alert {
            padding: 15px;
            margin: 20px 0;
            border-radius: 4px;
        }
        .alert-info {
            background-color: #d1ecf1;
            border-left: 4px solid #0c5460;
            color: #0c5460;
        }
        .alert-success {
            background-color: #d4edda;
            border-left: 4px solid #155724;
            color: #155724;
        }
        .alert-warning {
            background-color: #fff3cd;
            border-left: 4px solid #856404;
            color: #856404;
        }
        .timestamp {
            color: #999;
            font-size: 0.9em;
            text-align: right;
        }
        ul {
            line-height: 1.8;
        }
"#;

/// Self-contained HTML report: every chart is inlined as SVG markup, so
/// the file opens anywhere without sibling assets.
pub fn render(
    record: &ResultRecord,
    config: StrategyConfig,
    charts: &[(&str, String)],
) -> String {
    let spot = record.current_price;
    let strikes = &record.strikes;
    let payoff = &record.payoff;
    let vol = &record.volatility;

    let mut html = String::with_capacity(32 * 1024);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("    <title>Iron Condor Strategy Analysis</title>\n");
    html.push_str("    <style>");
    html.push_str(STYLE);
    html.push_str("    </style>\n</head>\n<body>\n    <div class=\"container\">\n");
    html.push_str("        <h1>Iron Condor Strategy Analysis</h1>\n");
    html.push_str(&format!(
        "        <p class=\"timestamp\">Generated: {}</p>\n",
        record.as_of.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    html.push_str("        <h2>Market Overview</h2>\n");
    open_grid(&mut html);
    card(&mut html, "Current Underlying Price", format!("${spot:.2}"));
    card(
        &mut html,
        "Days to Expiration",
        config.days_to_expiration.to_string(),
    );
    card(
        &mut html,
        "Expected Move",
        format!(
            "${:.2} ({:.2}%)",
            strikes.expected_move,
            pct_of_spot(strikes.expected_move, spot)
        ),
    );
    card(
        &mut html,
        "Risk Profile",
        config.risk_profile.to_string(),
    );
    close_grid(&mut html);

    html.push_str("        <h2>Volatility Analysis</h2>\n");
    open_grid(&mut html);
    card(
        &mut html,
        "Current Volatility",
        format!("{:.2}%", vol.annualized * 100.0),
    );
    for rolling in &vol.rolling {
        card(
            &mut html,
            &format!("{}-Day Volatility", rolling.window),
            format!("{:.2}%", rolling.annualized * 100.0),
        );
    }
    card(
        &mut html,
        "Volatility Percentile",
        match vol.percentile {
            Some(p) => format!("{p:.1}%"),
            None => "n/a".to_string(),
        },
    );
    card(&mut html, "Volatility Regime", vol.regime.to_string());
    close_grid(&mut html);

    html.push_str("        <h2>Iron Condor Strike Prices</h2>\n");
    html.push_str("        <table class=\"strike-table\">\n");
    html.push_str("            <thead>\n                <tr>\n");
    for header in ["Leg", "Action", "Type", "Strike Price", "Distance from Current"] {
        html.push_str(&format!("                    <th>{header}</th>\n"));
    }
    html.push_str("                </tr>\n            </thead>\n            <tbody>\n");
    let legs = [
        (1, "BUY", "Put", strikes.long_put, spot - strikes.long_put),
        (2, "SELL", "Put", strikes.short_put, spot - strikes.short_put),
        (3, "SELL", "Call", strikes.short_call, strikes.short_call - spot),
        (4, "BUY", "Call", strikes.long_call, strikes.long_call - spot),
    ];
    for (leg, action, kind, strike, distance) in legs {
        html.push_str("                <tr>\n");
        html.push_str(&format!("                    <td>{leg}</td>\n"));
        html.push_str(&format!("                    <td>{action}</td>\n"));
        html.push_str(&format!("                    <td>{kind}</td>\n"));
        html.push_str(&format!("                    <td>${strike:.0}</td>\n"));
        html.push_str(&format!(
            "                    <td>${distance:.2} ({:.2}%)</td>\n",
            pct_of_spot(distance, spot)
        ));
        html.push_str("                </tr>\n");
    }
    html.push_str("            </tbody>\n        </table>\n");

    html.push_str("        <h2>Profit &amp; Loss Analysis</h2>\n");
    open_grid(&mut html);
    card(&mut html, "Estimated Credit", format!("${:.2}", payoff.credit_received));
    card(&mut html, "Max Profit", format!("${:.2}", payoff.max_profit));
    card(&mut html, "Max Loss", format!("${:.2}", payoff.max_loss));
    card(
        &mut html,
        "Return on Risk",
        match payoff.return_on_risk {
            Some(r) => format!("{:.2}%", r * 100.0),
            None => "n/a".to_string(),
        },
    );
    card(
        &mut html,
        "Probability of Profit",
        format!("{:.2}%", payoff.probability_of_profit * 100.0),
    );
    close_grid(&mut html);

    html.push_str("        <h2>Breakeven Points</h2>\n");
    open_grid(&mut html);
    card(
        &mut html,
        "Lower Breakeven",
        format!("${:.2}", payoff.breakeven_lower),
    );
    card(
        &mut html,
        "Upper Breakeven",
        format!("${:.2}", payoff.breakeven_upper),
    );
    card(
        &mut html,
        "Breakeven Range",
        format!(
            "${:.2} ({:.2}%)",
            payoff.profit_zone_width,
            pct_of_spot(payoff.profit_zone_width, spot)
        ),
    );
    close_grid(&mut html);

    html.push_str("        <h2>Visual Analysis</h2>\n");
    for (name, svg) in charts {
        html.push_str(&format!(
            "        <div class=\"chart\">\n            <h3>{}</h3>\n",
            chart_title(name)
        ));
        html.push_str(svg);
        html.push_str("\n        </div>\n");
    }

    let (alert_class, alert_text) = regime_alert(vol.regime);
    html.push_str("        <h2>Trading Recommendations</h2>\n");
    html.push_str(&format!(
        "        <div class=\"alert {alert_class}\">\n            \
         <strong>Current Market Conditions:</strong> {alert_text}\n        </div>\n"
    ));
    advice_box(
        &mut html,
        "Entry Strategy",
        &[
            "Enter when volatility is in the moderate to elevated range",
            "Aim for 30-45 days to expiration for optimal time decay",
            "Target credit of 25-35% of the spread width",
        ],
    );
    advice_box(
        &mut html,
        "Management Rules",
        &[
            "Take profit at 50% of max profit",
            "Cut losses at 200% of credit received",
            "Consider rolling if 21 days remain and position is challenged",
        ],
    );
    advice_box(
        &mut html,
        "Risk Management",
        &[
            "Never risk more than 2-5% of account on a single trade",
            "Monitor position daily for any breach of short strikes",
            "Have an exit plan before entering the trade",
        ],
    );

    html.push_str(
        "        <p style=\"text-align: center; color: #999; margin-top: 40px; \
         padding: 20px; border-top: 1px solid #ddd;\">\n            \
         <strong>DISCLAIMER:</strong> This analysis is for educational purposes only. \
         Not financial advice. Trade at your own risk.\n        </p>\n",
    );
    html.push_str("    </div>\n</body>\n</html>\n");
    html
}

fn open_grid(html: &mut String) {
    html.push_str("        <div class=\"metric-grid\">\n");
}

fn close_grid(html: &mut String) {
    html.push_str("        </div>\n");
}

fn card(html: &mut String, label: &str, value: String) {
    html.push_str(&format!(
        "            <div class=\"metric-card\">\n                \
         <div class=\"metric-label\">{label}</div>\n                \
         <div class=\"metric-value\">{value}</div>\n            </div>\n"
    ));
}

fn advice_box(html: &mut String, title: &str, bullets: &[&str]) {
    html.push_str(&format!(
        "        <div class=\"alert alert-info\">\n            <strong>{title}:</strong>\n            <ul>\n"
    ));
    for bullet in bullets {
        html.push_str(&format!("                <li>{bullet}</li>\n"));
    }
    html.push_str("            </ul>\n        </div>\n");
}

fn regime_alert(regime: VolRegime) -> (&'static str, &'static str) {
    match regime {
        VolRegime::Low => (
            "alert-warning",
            "\u{26a0} Low volatility environment - smaller credits expected. \
             Consider waiting for higher volatility.",
        ),
        VolRegime::Moderate | VolRegime::Elevated => (
            "alert-success",
            "\u{2713} Good environment for Iron Condors. Proceed with standard position sizing.",
        ),
        VolRegime::High => (
            "alert-warning",
            "\u{26a0} High volatility - Increased risk. Consider wider strikes or reduced \
             position size.",
        ),
    }
}

/// "price_history.svg" -> "Price History"
fn chart_title(name: &str) -> String {
    let stem = name.trim_end_matches(".svg");
    let words: Vec<String> = stem
        .split('_')
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    words.join(" ")
}
