use chrono::NaiveDate;

/// 获取当前本地日期（账单默认日期）
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
