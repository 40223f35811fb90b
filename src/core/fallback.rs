//! 未設定模型金鑰時使用的關鍵字規則。
//!
//! 規則由上而下比對，第一個命中者生效。

use crate::domain::model::Draft;

const ELLIPSE_KEYWORDS: &[&str] = &["椭圆", "橢圓", "ellipse"];
const CIRCLE_KEYWORDS: &[&str] = &["圆", "圓", "circle"];
const MOTION_KEYWORDS: &[&str] = &[
    "动", "動", "运动", "旋转", "轨迹", "animate", "animation", "move", "moving",
];

struct Rule {
    name: &'static str,
    matches: fn(&str) -> bool,
    explanation: &'static str,
    commands: &'static [&'static str],
}

const RULES: &[Rule] = &[
    Rule {
        name: "ellipse",
        matches: mentions_ellipse,
        explanation: "（演示模式）已生成一个标准椭圆 x²/25 + y²/9 = 1，长半轴 5，短半轴 3。",
        commands: &[
            "ellipse: x^2 / 25 + y^2 / 9 = 1",
            "label = Text(\"x²/25 + y²/9 = 1\", (5.5, 3.5))",
        ],
    },
    Rule {
        name: "animated_circle",
        matches: mentions_moving_circle,
        explanation: "（演示模式）已生成半径为 5 的圆，点 P 由滑动条 t 驱动沿圆周运动。",
        commands: &[
            "O = (0, 0)",
            "c = Circle(O, 5)",
            "t = Slider(0, 2π, 0.01, 1, 150, false, true, true, false)",
            "P = (5; t)",
            "StartAnimation(t, true)",
        ],
    },
    Rule {
        name: "circle",
        matches: mentions_circle,
        explanation: "（演示模式）已生成以原点为圆心、半径为 5 的圆。",
        commands: &["O = (0, 0)", "Circle(O, 5)"],
    },
];

const EMPTY_INPUT_EXPLANATION: &str = "请描述你想要构造的几何图形，例如：画一个圆。";
const DEMO_MODE_EXPLANATION: &str =
    "当前服务处于演示模式（未配置模型 API Key），只支持“圆”“椭圆”“圆上运动的点”等示例。请配置 OPENAI_API_KEY 以启用完整的自然语言转换。";

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}

fn mentions_ellipse(text: &str) -> bool {
    contains_any(text, ELLIPSE_KEYWORDS)
}

fn mentions_circle(text: &str) -> bool {
    contains_any(text, CIRCLE_KEYWORDS)
}

fn mentions_moving_circle(text: &str) -> bool {
    mentions_circle(text) && contains_any(text, MOTION_KEYWORDS)
}

/// 依關鍵字產生確定性的指令；不做任何網路存取
pub fn generate_fallback(text: &str) -> Draft {
    let text = text.trim();
    if text.is_empty() {
        return Draft {
            explanation: EMPTY_INPUT_EXPLANATION.to_string(),
            commands: Vec::new(),
        };
    }

    let lowered = text.to_lowercase();
    match RULES.iter().find(|rule| (rule.matches)(&lowered)) {
        Some(rule) => {
            tracing::debug!("Fallback rule '{}' matched", rule.name);
            Draft {
                explanation: rule.explanation.to_string(),
                commands: rule.commands.iter().map(|c| c.to_string()).collect(),
            }
        }
        None => Draft {
            explanation: DEMO_MODE_EXPLANATION.to_string(),
            commands: Vec::new(),
        },
    }
}
