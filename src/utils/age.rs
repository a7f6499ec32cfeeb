use chrono::{Datelike, NaiveDate};

use super::error::AppError;

/// 만 나이 계산
///
/// 올해 생일이 지나지 않았으면 한 살을 뺍니다.
/// 2월 29일생은 윤년이 아닌 해에는 3월 1일에 생일이 지난 것으로 봅니다.
pub fn calculate_age(date_of_birth: NaiveDate, today: NaiveDate) -> Result<u32, AppError> {
    if date_of_birth > today {
        return Err(AppError::BadRequest(
            "생년월일은 오늘 이후일 수 없습니다.".to_string(),
        ));
    }

    let mut age = today.year() - date_of_birth.year();

    // (월, 일) 튜플 비교. 2/29 생일은 평년에 (2, 29) > (2, 28) 이므로 3/1부터 지난 것으로 처리된다.
    let birthday_passed =
        (today.month(), today.day()) >= (date_of_birth.month(), date_of_birth.day());
    if !birthday_passed {
        age -= 1;
    }

    Ok(age as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn should_count_birthday_on_the_day() {
        assert_eq!(calculate_age(date(1990, 6, 15), date(2020, 6, 15)).unwrap(), 30);
    }

    #[test]
    fn should_not_count_birthday_one_day_before() {
        assert_eq!(calculate_age(date(1990, 6, 15), date(2020, 6, 14)).unwrap(), 29);
    }

    #[test]
    fn should_handle_month_boundary() {
        // 생일 달은 지났지만 날짜가 남은 경우와 생일 달 이전인 경우
        assert_eq!(calculate_age(date(2000, 12, 31), date(2021, 12, 30)).unwrap(), 20);
        assert_eq!(calculate_age(date(2000, 1, 1), date(2021, 12, 31)).unwrap(), 21);
    }

    #[test]
    fn leap_day_birthday_should_not_pass_on_feb_28_of_common_year() {
        assert_eq!(calculate_age(date(2000, 2, 29), date(2023, 2, 28)).unwrap(), 22);
    }

    #[test]
    fn leap_day_birthday_should_pass_on_mar_1_of_common_year() {
        assert_eq!(calculate_age(date(2000, 2, 29), date(2023, 3, 1)).unwrap(), 23);
    }

    #[test]
    fn leap_day_birthday_should_pass_on_feb_29_of_leap_year() {
        assert_eq!(calculate_age(date(2000, 2, 29), date(2024, 2, 29)).unwrap(), 24);
    }

    #[test]
    fn newborn_should_be_zero() {
        assert_eq!(calculate_age(date(2024, 5, 1), date(2024, 5, 1)).unwrap(), 0);
    }

    #[test]
    fn future_birth_date_should_fail() {
        let result = calculate_age(date(2030, 1, 1), date(2024, 1, 1));

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
