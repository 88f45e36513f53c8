use std::time::Duration;

use assert_let_bind::assert_let;
use rqes_ui::screen::options_selection::{self as options, SheetContent};
use rqes_ui::screen::{success, SheetAction};
use rqes_ui::{Navigation, RqesUi, Route, Screen, SdkState};
use test_utils::sample;
use test_utils::service::{Failure, FakeSigningService, Operation};
use test_utils::store::MemoryDocumentStore;
use url::Url;

type Sdk = RqesUi<FakeSigningService, MemoryDocumentStore>;

fn sdk(service: FakeSigningService, store: MemoryDocumentStore) -> Sdk {
    test_utils::init_tracer();
    RqesUi::new(sample::config(), service, store).expect("should create")
}

// Run through the entire flow, leaving for the QTSP twice.
#[tokio::test]
async fn signing_flow() {
    let store = MemoryDocumentStore::new();
    let sdk = sdk(FakeSigningService::new(), store.clone());

    let route = sdk.initiate(sample::document());
    let url = select_qtsp(&sdk, &route).await;
    let qtsp = sample::qtsps().remove(0);
    assert_eq!(url, sample::service_authorization_url(&sample::service(&qtsp)));

    // back from service authorization
    let route = sdk.resume("service-code").expect("should resume");
    assert_eq!(sdk.state(), SdkState::Certificate);
    let url = select_certificate(&sdk, &route).await;
    let authorized = sample::authorized_service(&sample::service(&qtsp));
    assert_eq!(url, sample::credential_authorization_url(&authorized, &sample::certificates(1)[0]));

    // back from credential authorization
    let route = sdk.resume("credential-code").expect("should resume");
    assert_eq!(route, Route::Success);
    let uri = sign_and_share(&sdk, &route).await;
    assert_eq!(store.get(uri.as_str()), Some(sample::signed_content()));

    sdk.finish();
    assert_eq!(sdk.state(), SdkState::None);
}

// Open the QTSP step, pick the first provider and leave for authorization.
async fn select_qtsp(sdk: &Sdk, route: &Route) -> Url {
    assert_let!(Screen::OptionsSelection(screen), sdk.open(route));
    let mut effects = screen.take_effects().expect("should take effects");
    let mut state = screen.subscribe();

    screen.submit(options::Intent::Initialize);
    screen.submit(options::Intent::DocumentConfirmed);
    screen.submit(options::Intent::QtspItemPressed);
    screen.submit(options::Intent::QtspIndexSelectedOnRadioButtonPressed(0));
    screen.submit(options::Intent::QtspSelectedOnDoneButtonPressed(0));

    assert_eq!(effects.recv().await, Some(options::Effect::ShowBottomSheet));
    assert_eq!(effects.recv().await, Some(options::Effect::CloseBottomSheet));
    assert_let!(Some(options::Effect::OnSelectedQtspUpdated(service)), effects.recv().await);
    assert_eq!(service.qtsp, sample::qtsps()[0]);

    let url = state
        .wait_for(|s| s.is_bottom_bar_button_enabled)
        .await
        .expect("should be ready")
        .authorization_url
        .clone()
        .expect("should have url");

    screen.submit(options::Intent::BottomBarButtonPressed(url.clone()));
    assert_eq!(effects.recv().await, Some(options::Effect::OpenUrl(url.clone())));
    assert_eq!(effects.recv().await, Some(options::Effect::Navigation(Navigation::Finish)));
    url
}

// Certificates load on entry; accept the default and leave for
// authorization.
async fn select_certificate(sdk: &Sdk, route: &Route) -> Url {
    assert_let!(Screen::OptionsSelection(screen), sdk.open(route));
    let mut effects = screen.take_effects().expect("should take effects");
    let mut state = screen.subscribe();

    screen.submit(options::Intent::Initialize);
    let ready = state
        .wait_for(|s| s.is_bottom_bar_button_enabled)
        .await
        .expect("should be ready")
        .clone();
    assert_eq!(ready.certificates.len(), 2);
    assert!(!ready.is_loading);
    assert!(ready.error.is_none());

    let url = ready.authorization_url.expect("should have url");
    screen.submit(options::Intent::BottomBarButtonPressed(url.clone()));
    assert_eq!(effects.recv().await, Some(options::Effect::OpenUrl(url.clone())));
    assert_eq!(effects.recv().await, Some(options::Effect::Navigation(Navigation::Finish)));
    url
}

// Sign, then share the signed copy.
async fn sign_and_share(sdk: &Sdk, route: &Route) -> Url {
    assert_let!(Screen::Success(screen), sdk.open(route));
    let mut effects = screen.take_effects().expect("should take effects");
    let mut state = screen.subscribe();

    screen.submit(success::Intent::Initialize);
    state.wait_for(|s| s.is_bottom_bar_button_enabled).await.expect("should be signed");

    screen.submit(success::Intent::BottomBarButtonPressed);
    screen.submit(success::Intent::BottomSheetAction(SheetAction::Share));
    assert_eq!(effects.recv().await, Some(success::Effect::ShowBottomSheet));
    assert_eq!(effects.recv().await, Some(success::Effect::CloseBottomSheet));
    assert_let!(Some(success::Effect::SharePdf { uri, chooser_title }), effects.recv().await);
    assert_eq!(chooser_title, "Share contract_signed.pdf via");
    uri
}

// Repeated requests while certificates load start a single authorization.
#[tokio::test]
async fn no_duplicate_authorization() {
    let service = FakeSigningService::new().with_latency(Duration::from_millis(50));
    let sdk = sdk(service.clone(), MemoryDocumentStore::new());
    sdk.initiate(sample::document());
    let qtsp = sample::qtsps().remove(0);
    sdk.session().set_qtsp(qtsp.clone(), sample::service(&qtsp));
    let route = sdk.resume("service-code").expect("should resume");

    assert_let!(Screen::OptionsSelection(screen), sdk.open(&route));
    let mut state = screen.subscribe();
    screen.submit(options::Intent::Initialize);
    screen.submit(options::Intent::AuthorizeServiceAndFetchCertificates);
    screen.submit(options::Intent::AuthorizeServiceAndFetchCertificates);

    state.wait_for(|s| s.is_bottom_bar_button_enabled).await.expect("should be ready");
    assert_eq!(service.calls(Operation::AuthorizeService), 1);
    assert_eq!(service.calls(Operation::ListCertificates), 1);
}

// A failed authorization is shown and can be retried.
#[tokio::test]
async fn retry_authorization() {
    let service = FakeSigningService::new();
    service.fail(Operation::AuthorizeService, Failure::Error("X".into()));
    let sdk = sdk(service.clone(), MemoryDocumentStore::new());
    sdk.initiate(sample::document());
    let qtsp = sample::qtsps().remove(0);
    sdk.session().set_qtsp(qtsp.clone(), sample::service(&qtsp));
    let route = sdk.resume("service-code").expect("should resume");

    assert_let!(Screen::OptionsSelection(screen), sdk.open(&route));
    let mut state = screen.subscribe();
    screen.submit(options::Intent::Initialize);

    let error = state
        .wait_for(|s| s.error.is_some())
        .await
        .expect("should fail")
        .error
        .clone()
        .expect("should have error");
    assert_eq!(error.message, "X");
    assert_eq!(error.on_cancel, options::Intent::Finish);

    service.recover(Operation::AuthorizeService);
    screen.submit(options::Intent::RetryRequested);
    let ready = state
        .wait_for(|s| s.is_bottom_bar_button_enabled)
        .await
        .expect("should be ready")
        .clone();
    assert!(ready.error.is_none());
    assert_eq!(service.calls(Operation::AuthorizeService), 2);
}

// Back from any step asks before abandoning the flow.
#[tokio::test]
async fn cancel_flow() {
    let sdk = sdk(FakeSigningService::new(), MemoryDocumentStore::new());
    let route = sdk.initiate(sample::document());

    assert_let!(Screen::OptionsSelection(screen), sdk.open(&route));
    let mut effects = screen.take_effects().expect("should take effects");
    screen.submit(options::Intent::Initialize);
    screen.submit(options::Intent::Pop);
    assert_eq!(effects.recv().await, Some(options::Effect::ShowBottomSheet));
    assert_let!(Some(SheetContent::ConfirmCancellation(_)), screen.state().sheet_content);

    screen.submit(options::Intent::BottomSheetAction(SheetAction::CancelSigning));
    assert_eq!(effects.recv().await, Some(options::Effect::CloseBottomSheet));
    assert_eq!(effects.recv().await, Some(options::Effect::Navigation(Navigation::Finish)));
}

// Closing a screen mid-call drops the call and its effects.
#[tokio::test]
async fn close_while_loading() {
    let service = FakeSigningService::new().with_latency(Duration::from_secs(3600));
    let sdk = sdk(service, MemoryDocumentStore::new());
    sdk.initiate(sample::document());
    let qtsp = sample::qtsps().remove(0);
    sdk.session().set_qtsp(qtsp.clone(), sample::service(&qtsp));
    let route = sdk.resume("service-code").expect("should resume");

    assert_let!(Screen::OptionsSelection(screen), sdk.open(&route));
    let mut effects = screen.take_effects().expect("should take effects");
    let mut state = screen.subscribe();
    screen.submit(options::Intent::Initialize);
    state.wait_for(|s| s.is_loading).await.expect("should be loading");

    drop(screen);
    let next = tokio::time::timeout(Duration::from_secs(1), effects.recv())
        .await
        .expect("should not time out");
    assert_eq!(next, None);
}
