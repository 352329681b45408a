// ==========================================
// RAB 估价引擎 - S 曲线分配
// ==========================================
// 权重: weight_pct(item) = total_cost / grand_total × 100
// 周权重: 活动周内均摊 weight_pct / duration_weeks
// 累计: cumulative(w) = min(100, cumulative(w-1) + weekly(w))，负周权重不回退
// 周次: 窗口结束周超过 MAX_SCHEDULE_WEEK 的部分不展开
// 红线: grand_total = 0 → INSUFFICIENT_DATA（不是错误）
// ==========================================

use crate::domain::project::MAX_SCHEDULE_WEEK;
use crate::domain::report::{CostedLineItem, ScheduleCurve, SchedulePoint};
use crate::domain::types::ScheduleStatus;
use tracing::{debug, instrument, warn};

/// 累计上限（%）
pub const CUMULATIVE_CAP_PCT: f64 = 100.0;

/// 计算 S 曲线
#[instrument(skip(costed), fields(items = costed.len()))]
pub fn compute_s_curve(costed: &[CostedLineItem]) -> ScheduleCurve {
    let grand_total: f64 = costed.iter().map(|item| item.total_cost).sum();
    if grand_total == 0.0 || !grand_total.is_finite() {
        debug!(grand_total, "总造价为 0，S 曲线无定义");
        return ScheduleCurve::insufficient_data();
    }

    let windows: Vec<_> = costed.iter().map(CostedLineItem::window).collect();

    let latest = windows.iter().map(|w| w.end).max().unwrap_or(1);
    if latest > MAX_SCHEDULE_WEEK {
        warn!(latest, limit = MAX_SCHEDULE_WEEK, "工期超出排程上限，超出部分不计入 S 曲线");
    }
    let max_week = latest.min(MAX_SCHEDULE_WEEK);

    let mut points = Vec::with_capacity(max_week as usize);
    let mut cumulative = 0.0_f64;

    for week in 1..=max_week {
        let weekly: f64 = costed
            .iter()
            .zip(&windows)
            .filter(|(_, window)| window.contains(week))
            .map(|(item, window)| item.total_cost / grand_total * 100.0 / f64::from(window.duration))
            .sum();

        cumulative = (cumulative + weekly).max(cumulative).min(CUMULATIVE_CAP_PCT);
        points.push(SchedulePoint {
            week_index: week,
            weekly_weight_pct: weekly,
            cumulative_pct: cumulative,
        });
    }

    debug!(weeks = max_week, final_pct = cumulative, "S 曲线计算完成");
    ScheduleCurve {
        status: ScheduleStatus::Ready,
        points,
    }
}
