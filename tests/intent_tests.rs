use malo::catalog::MenuCatalog;
use malo::kernel::intent::{Intent, IntentClassifier, Utterances};

fn classifier() -> IntentClassifier {
    IntentClassifier::new(&MenuCatalog::kiosk_default()).unwrap()
}

fn said<'a>(user: &'a str, reply: &'a str) -> Utterances<'a> {
    Utterances {
        user_text: Some(user),
        stt_text: None,
        reply_text: reply,
        remove_flag: false,
    }
}

#[test]
fn test_previous_navigation_question_wins() {
    let c = classifier();
    let input = said("이전 화면으로 어떻게 가?", "왼쪽 아래 버튼을 누르세요.");

    assert_eq!(c.classify(&input), Intent::PreviousNavigationQuestion);
    assert!(
        c.families(&input).contains(&Intent::PreviousStepRequest),
        "Both families match; precedence picks the question"
    );
}

#[test]
fn test_removal_forms() {
    let c = classifier();

    assert_eq!(c.classify(&said("장바구니에서 티라미수 빼줘", "")), Intent::RemovalRequest);
    assert_eq!(c.classify(&said("음", "티라미수를 제거했습니다.")), Intent::RemovalRequest);

    let mut flagged = said("그거 말고", "알겠습니다.");
    flagged.remove_flag = true;
    assert_eq!(c.classify(&flagged), Intent::RemovalRequest);
}

#[test]
fn test_removal_beats_location() {
    let c = classifier();
    let input = said("장바구니 어디 있어? 티라미수 빼줘", "");

    let families = c.families(&input);
    assert!(families.contains(&Intent::LocationQuestion));
    assert_eq!(c.classify(&input), Intent::RemovalRequest);
}

#[test]
fn test_location_question() {
    let c = classifier();
    assert_eq!(c.classify(&said("장바구니 어디 있어?", "")), Intent::LocationQuestion);
    assert_eq!(
        c.classify(&said("음", "장바구니는 화면 오른쪽에 있어요.")),
        Intent::LocationQuestion,
        "A reply that describes a screen location counts"
    );
}

#[test]
fn test_payment_and_dessert_existence() {
    let c = classifier();
    assert_eq!(c.classify(&said("결제할게요", "")), Intent::PaymentRequest);
    assert_eq!(c.classify(&said("티라미수 있어요?", "")), Intent::DessertExistenceQuestion);
    assert_eq!(c.classify(&said("아메리카노 있어요?", "")), Intent::None);
}

#[test]
fn test_stt_text_is_checked() {
    let c = classifier();
    let input = Utterances {
        user_text: Some("음성 메시지를 전송했어요."),
        stt_text: Some("장바구니에서 빼줘"),
        reply_text: "",
        remove_flag: false,
    };
    assert_eq!(c.classify(&input), Intent::RemovalRequest);
}

#[test]
fn test_plain_order_is_none() {
    let c = classifier();
    assert_eq!(c.classify(&said("아메리카노 주세요", "아메리카노 선택하셨어요.")), Intent::None);
    assert_eq!(c.classify(&said("이전으로", "")), Intent::PreviousStepRequest);
    assert_eq!(Intent::default(), Intent::None, "No family means no intent");
}

#[test]
fn test_coupon_indication() {
    let c = classifier();
    assert!(c.coupon_indicated(&said("", "바코드를 스캔해주세요."), None));
    assert!(c.coupon_indicated(&said("쿠폰 쓸게요", ""), None));
    assert!(c.coupon_indicated(&said("", ""), Some("coupon")));
    assert!(!c.coupon_indicated(&said("카드요", "카드를 넣어주세요."), Some("card")));
}
